//! What the viewer remembers about the level, and the lit-room overlay applied on top of FOV.

use crate::fov::VisibilityGrid;
use crate::map::Map;
use crate::types::{Pos, TileKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibilityState {
    /// Never seen.
    Unknown,
    /// Seen before, not in view now.
    Remembered,
    Visible,
}

/// Last-seen tile per cell, kept apart from the live grid so a changed level still shows
/// stale memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapMemory {
    width: usize,
    height: usize,
    explored: Vec<bool>,
    remembered: Vec<TileKind>,
    visible: Vec<bool>,
}

impl MapMemory {
    pub fn new(width: usize, height: usize) -> Self {
        let cells = width * height;
        Self {
            width,
            height,
            explored: vec![false; cells],
            remembered: vec![TileKind::Unknown; cells],
            visible: vec![false; cells],
        }
    }

    pub fn for_map(map: &Map) -> Self {
        Self::new(map.width(), map.height())
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        pos.in_bounds(self.width, self.height)
            .then(|| (pos.y as usize) * self.width + (pos.x as usize))
    }

    /// Replaces the current view with `fov` and records the tile under every visible cell.
    pub fn update(&mut self, map: &Map, fov: &VisibilityGrid) {
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Pos { y: y as i32, x: x as i32 };
                let idx = y * self.width + x;
                let seen = fov.is_visible(pos);
                self.visible[idx] = seen;
                if seen {
                    self.explored[idx] = true;
                    self.remembered[idx] = map.tile(pos);
                }
            }
        }
    }

    pub fn is_explored(&self, pos: Pos) -> bool {
        self.index(pos).is_some_and(|idx| self.explored[idx])
    }

    pub fn is_visible(&self, pos: Pos) -> bool {
        self.index(pos).is_some_and(|idx| self.visible[idx])
    }

    pub fn remembered(&self, pos: Pos) -> TileKind {
        self.index(pos).map_or(TileKind::Unknown, |idx| self.remembered[idx])
    }

    pub fn visibility(&self, pos: Pos) -> VisibilityState {
        match self.index(pos) {
            Some(idx) if self.visible[idx] => VisibilityState::Visible,
            Some(idx) if self.explored[idx] => VisibilityState::Remembered,
            _ => VisibilityState::Unknown,
        }
    }

    pub fn forget_all(&mut self) {
        self.explored.fill(false);
        self.remembered.fill(TileKind::Unknown);
        self.visible.fill(false);
    }
}

/// Forces the lit room containing `viewer` (floor plus its wall ring) visible and explored.
/// Returns false when the viewer is not inside a lit room.
pub fn reveal_lit_room(map: &mut Map, viewer: Pos) -> bool {
    let Some(room) = map.room_at(viewer).copied() else {
        return false;
    };
    if !room.is_lit() {
        return false;
    }
    for y in room.top()..=room.bottom() {
        for x in room.left()..=room.right() {
            map.set_visible(Pos { y, x }, true);
        }
    }
    true
}
