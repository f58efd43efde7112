use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Grid coordinate. Field order makes the derived ordering sort by `y` then `x`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn euclidean(self, other: Pos) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    pub fn distance_squared(self, other: Pos) -> i64 {
        let dx = i64::from(self.x - other.x);
        let dy = i64::from(self.y - other.y);
        dx * dx + dy * dy
    }

    pub fn neighbors4(self) -> [Pos; 4] {
        CARDINAL.map(|dir| self + dir)
    }

    pub fn neighbors8(self) -> [Pos; 8] {
        ALL_DIRECTIONS.map(|dir| self + dir)
    }

    pub fn in_bounds(self, width: usize, height: usize) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as usize) < width && (self.y as usize) < height
    }
}

impl Add for Pos {
    type Output = Pos;

    fn add(self, rhs: Pos) -> Pos {
        Pos { y: self.y + rhs.y, x: self.x + rhs.x }
    }
}

impl Sub for Pos {
    type Output = Pos;

    fn sub(self, rhs: Pos) -> Pos {
        Pos { y: self.y - rhs.y, x: self.x - rhs.x }
    }
}

pub const NORTH: Pos = Pos { y: -1, x: 0 };
pub const SOUTH: Pos = Pos { y: 1, x: 0 };
pub const EAST: Pos = Pos { y: 0, x: 1 };
pub const WEST: Pos = Pos { y: 0, x: -1 };
pub const NORTH_EAST: Pos = Pos { y: -1, x: 1 };
pub const NORTH_WEST: Pos = Pos { y: -1, x: -1 };
pub const SOUTH_EAST: Pos = Pos { y: 1, x: 1 };
pub const SOUTH_WEST: Pos = Pos { y: 1, x: -1 };

/// Flood fills walk these in order, so component discovery is stable.
pub const CARDINAL: [Pos; 4] = [NORTH, EAST, SOUTH, WEST];
pub const DIAGONAL: [Pos; 4] = [NORTH_EAST, NORTH_WEST, SOUTH_EAST, SOUTH_WEST];
pub const ALL_DIRECTIONS: [Pos; 8] =
    [NORTH, SOUTH, EAST, WEST, NORTH_EAST, NORTH_WEST, SOUTH_EAST, SOUTH_WEST];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Floor,
    Wall,
    StairsDown,
    StairsUp,
    DoorClosed,
    DoorOpen,
    Water,
    Lava,
    Void,
    Unknown,
}

/// Static per-kind properties. Never mutated at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileProperties {
    pub glyph: char,
    pub walkable: bool,
    pub transparent: bool,
    pub destructible: bool,
    pub name: &'static str,
}

const fn props(
    glyph: char,
    walkable: bool,
    transparent: bool,
    destructible: bool,
    name: &'static str,
) -> TileProperties {
    TileProperties { glyph, walkable, transparent, destructible, name }
}

const FLOOR_PROPS: TileProperties = props('·', true, true, false, "Stone Floor");
const WALL_PROPS: TileProperties = props('█', false, false, true, "Stone Wall");
const STAIRS_DOWN_PROPS: TileProperties = props('▼', true, true, false, "Stairs Down");
const STAIRS_UP_PROPS: TileProperties = props('▲', true, true, false, "Stairs Up");
const DOOR_CLOSED_PROPS: TileProperties = props('▦', false, false, true, "Closed Door");
const DOOR_OPEN_PROPS: TileProperties = props('▢', true, true, false, "Open Door");
const WATER_PROPS: TileProperties = props('≈', false, true, false, "Water");
const LAVA_PROPS: TileProperties = props('≈', false, true, false, "Lava");
const VOID_PROPS: TileProperties = props(' ', false, false, false, "Void");
const UNKNOWN_PROPS: TileProperties = props('?', false, false, false, "Unknown");

impl TileKind {
    pub const ALL: [TileKind; 10] = [
        TileKind::Floor,
        TileKind::Wall,
        TileKind::StairsDown,
        TileKind::StairsUp,
        TileKind::DoorClosed,
        TileKind::DoorOpen,
        TileKind::Water,
        TileKind::Lava,
        TileKind::Void,
        TileKind::Unknown,
    ];

    pub const fn properties(self) -> &'static TileProperties {
        match self {
            TileKind::Floor => &FLOOR_PROPS,
            TileKind::Wall => &WALL_PROPS,
            TileKind::StairsDown => &STAIRS_DOWN_PROPS,
            TileKind::StairsUp => &STAIRS_UP_PROPS,
            TileKind::DoorClosed => &DOOR_CLOSED_PROPS,
            TileKind::DoorOpen => &DOOR_OPEN_PROPS,
            TileKind::Water => &WATER_PROPS,
            TileKind::Lava => &LAVA_PROPS,
            TileKind::Void => &VOID_PROPS,
            TileKind::Unknown => &UNKNOWN_PROPS,
        }
    }

    pub const fn glyph(self) -> char {
        self.properties().glyph
    }

    pub const fn is_walkable(self) -> bool {
        self.properties().walkable
    }

    pub const fn is_transparent(self) -> bool {
        self.properties().transparent
    }

    pub const fn is_destructible(self) -> bool {
        self.properties().destructible
    }

    pub const fn name(self) -> &'static str {
        self.properties().name
    }

    /// Walkable, or a closed door that can be opened.
    pub const fn is_traversable(self) -> bool {
        self.is_walkable() || matches!(self, TileKind::DoorClosed)
    }

    pub const fn is_stairs(self) -> bool {
        matches!(self, TileKind::StairsDown | TileKind::StairsUp)
    }

    pub(crate) const fn code(self) -> u8 {
        match self {
            TileKind::Floor => 0,
            TileKind::Wall => 1,
            TileKind::StairsDown => 2,
            TileKind::StairsUp => 3,
            TileKind::DoorClosed => 4,
            TileKind::DoorOpen => 5,
            TileKind::Water => 6,
            TileKind::Lava => 7,
            TileKind::Void => 8,
            TileKind::Unknown => 9,
        }
    }
}
