//! The tile grid: tiles, per-cell visibility, exploration memory and the room list.

use sha2::{Digest, Sha256};
use xxhash_rust::xxh3::xxh3_64;

use crate::fov::{self, VisibilityGrid};
use crate::memory::reveal_lit_room;
use crate::room::{Room, RoomType};
use crate::types::{Pos, TileKind};

pub const DEFAULT_WIDTH: usize = 198;
pub const DEFAULT_HEIGHT: usize = 66;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Map {
    width: usize,
    height: usize,
    tiles: Vec<TileKind>,
    visible: Vec<bool>,
    explored: Vec<bool>,
    rooms: Vec<Room>,
}

impl Default for Map {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Map {
    /// Creates a Void-filled grid. Dimensions are fixed for the lifetime of the map.
    pub fn new(width: usize, height: usize) -> Self {
        let cells = width * height;
        Self {
            width,
            height,
            tiles: vec![TileKind::Void; cells],
            visible: vec![false; cells],
            explored: vec![false; cells],
            rooms: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn center(&self) -> Pos {
        Pos { y: (self.height / 2) as i32, x: (self.width / 2) as i32 }
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.in_bounds(self.width, self.height)
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        self.in_bounds(pos).then(|| (pos.y as usize) * self.width + (pos.x as usize))
    }

    /// Row-major walk over every cell.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height).flat_map(move |y| (0..width).map(move |x| Pos { y, x }))
    }

    /// Out-of-bounds reads return `Void`.
    pub fn tile(&self, pos: Pos) -> TileKind {
        self.index(pos).map_or(TileKind::Void, |idx| self.tiles[idx])
    }

    /// Out-of-bounds writes are ignored.
    pub fn set_tile(&mut self, pos: Pos, kind: TileKind) {
        if let Some(idx) = self.index(pos) {
            self.tiles[idx] = kind;
        }
    }

    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.tile(pos).is_walkable()
    }

    pub fn is_transparent(&self, pos: Pos) -> bool {
        self.tile(pos).is_transparent()
    }

    pub fn is_traversable(&self, pos: Pos) -> bool {
        self.tile(pos).is_traversable()
    }

    pub fn glyph(&self, pos: Pos) -> char {
        self.tile(pos).glyph()
    }

    pub fn fill(&mut self, kind: TileKind) {
        self.tiles.fill(kind);
    }

    pub fn is_visible(&self, pos: Pos) -> bool {
        self.index(pos).is_some_and(|idx| self.visible[idx])
    }

    /// Marking a cell visible also marks it explored.
    pub fn set_visible(&mut self, pos: Pos, visible: bool) {
        if let Some(idx) = self.index(pos) {
            self.visible[idx] = visible;
            if visible {
                self.explored[idx] = true;
            }
        }
    }

    pub fn is_explored(&self, pos: Pos) -> bool {
        self.index(pos).is_some_and(|idx| self.explored[idx])
    }

    pub fn set_explored(&mut self, pos: Pos, explored: bool) {
        if let Some(idx) = self.index(pos) {
            self.explored[idx] = explored;
        }
    }

    pub fn clear_visible(&mut self) {
        self.visible.fill(false);
    }

    pub fn forget_explored(&mut self) {
        self.explored.fill(false);
    }

    /// Explored cells in row-major order; this is what a save file persists.
    pub fn explored_points(&self) -> Vec<Pos> {
        self.positions().filter(|&pos| self.is_explored(pos)).collect()
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|&&tile| tile == kind).count()
    }

    pub fn find_first(&self, kind: TileKind) -> Option<Pos> {
        self.positions().find(|&pos| self.tile(pos) == kind)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, index: usize) -> Option<&Room> {
        self.rooms.get(index)
    }

    pub fn add_room(&mut self, room: Room) {
        self.rooms.push(room);
    }

    pub fn clear_rooms(&mut self) {
        self.rooms.clear();
    }

    /// Index of the first room whose rectangle contains `pos`.
    pub fn room_index_at(&self, pos: Pos) -> Option<usize> {
        self.rooms.iter().position(|room| room.contains(pos))
    }

    pub fn room_at(&self, pos: Pos) -> Option<&Room> {
        self.room_index_at(pos).map(|idx| &self.rooms[idx])
    }

    /// Resets tiles, rooms and visibility ahead of regeneration.
    pub fn reset(&mut self) {
        self.fill(TileKind::Void);
        self.rooms.clear();
        self.clear_visible();
        self.forget_explored();
    }

    /// Copies a computed field of view into the per-cell flags.
    pub fn apply_visibility(&mut self, grid: &VisibilityGrid) {
        self.clear_visible();
        for pos in grid.visible_points() {
            self.set_visible(pos, true);
        }
    }

    /// Recomputes visibility for a viewer, then forces a lit room the viewer stands in fully
    /// visible.
    pub fn update_visibility(&mut self, viewer: Pos, radius: i32) {
        let mut grid = VisibilityGrid::default();
        fov::calculate(self, viewer, radius, &mut grid);
        self.apply_visibility(&grid);
        reveal_lit_room(self, viewer);
    }

    /// Stable byte encoding of dimensions, tiles and rooms. Visibility is not part of the layout.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + self.tiles.len() + self.rooms.len() * 18);
        bytes.extend((self.width as u32).to_le_bytes());
        bytes.extend((self.height as u32).to_le_bytes());
        bytes.extend(self.tiles.iter().map(|tile| tile.code()));
        bytes.extend((self.rooms.len() as u32).to_le_bytes());
        for room in &self.rooms {
            bytes.extend(room.x.to_le_bytes());
            bytes.extend(room.y.to_le_bytes());
            bytes.extend(room.width.to_le_bytes());
            bytes.extend(room.height.to_le_bytes());
            bytes.push(match room.room_type {
                RoomType::Normal => 0,
                RoomType::Entrance => 1,
                RoomType::Treasure => 2,
                RoomType::Boss => 3,
                RoomType::Corridor => 4,
                RoomType::Special => 5,
            });
            bytes.push(u8::from(room.is_lit()));
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }

    pub fn layout_sha256_hex(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_bytes());
        let result = hasher.finalize();
        format!("{result:064x}")
    }

    pub fn render_ascii(&self) -> String {
        let mut text = String::with_capacity((self.width + 1) * self.height * 3);
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                text.push(self.glyph(Pos { y, x }));
            }
            text.push('\n');
        }
        text
    }
}
