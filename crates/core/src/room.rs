//! Rectangular rooms. The rectangle includes the one-tile wall ring.

use serde::{Deserialize, Serialize};

use crate::types::Pos;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    #[default]
    Normal,
    Entrance,
    Treasure,
    Boss,
    Corridor,
    Special,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub room_type: RoomType,
    lit: bool,
}

impl Room {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height, room_type: RoomType::Normal, lit: false }
    }

    pub const fn with_type(mut self, room_type: RoomType) -> Self {
        self.room_type = room_type;
        self
    }

    pub const fn with_lit(mut self, lit: bool) -> Self {
        self.lit = lit;
        self
    }

    pub const fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn set_lit(&mut self, lit: bool) {
        self.lit = lit;
    }

    pub const fn left(&self) -> i32 {
        self.x
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width - 1
    }

    pub const fn top(&self) -> i32 {
        self.y
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height - 1
    }

    pub const fn area(&self) -> i32 {
        self.width * self.height
    }

    pub const fn center(&self) -> Pos {
        Pos { y: self.y + self.height / 2, x: self.x + self.width / 2 }
    }

    /// At least one interior floor cell inside the wall ring.
    pub const fn is_valid(&self) -> bool {
        self.width >= 3 && self.height >= 3
    }

    pub const fn contains(&self, pos: Pos) -> bool {
        pos.x >= self.x
            && pos.x < self.x + self.width
            && pos.y >= self.y
            && pos.y < self.y + self.height
    }

    pub const fn expanded(&self, padding: i32) -> Self {
        Self {
            x: self.x - padding,
            y: self.y - padding,
            width: self.width + 2 * padding,
            height: self.height + 2 * padding,
            room_type: self.room_type,
            lit: self.lit,
        }
    }

    /// Padded bounding boxes intersect on both axes. Rooms that merely touch do not overlap.
    pub fn overlaps(&self, other: &Room, padding: i32) -> bool {
        let a = self.expanded(padding);
        let b = other.expanded(padding);
        if a.left() > b.right() || b.left() > a.right() {
            return false;
        }
        !(a.top() > b.bottom() || b.top() > a.bottom())
    }

    /// Top and bottom rows first, then the side columns without the corners.
    pub fn perimeter(&self) -> Vec<Pos> {
        let mut points = Vec::with_capacity((2 * (self.width + self.height)).max(0) as usize);
        for x in self.left()..=self.right() {
            points.push(Pos { y: self.top(), x });
            points.push(Pos { y: self.bottom(), x });
        }
        for y in (self.top() + 1)..self.bottom() {
            points.push(Pos { y, x: self.left() });
            points.push(Pos { y, x: self.right() });
        }
        points
    }

    pub fn floor_tiles(&self) -> Vec<Pos> {
        let mut points = Vec::new();
        for y in (self.top() + 1)..self.bottom() {
            for x in (self.left() + 1)..self.right() {
                points.push(Pos { y, x });
            }
        }
        points
    }

    pub fn is_corner(&self, pos: Pos) -> bool {
        (pos.x == self.left() || pos.x == self.right())
            && (pos.y == self.top() || pos.y == self.bottom())
    }

    pub fn is_on_perimeter(&self, pos: Pos) -> bool {
        self.contains(pos)
            && (pos.x == self.left()
                || pos.x == self.right()
                || pos.y == self.top()
                || pos.y == self.bottom())
    }
}
