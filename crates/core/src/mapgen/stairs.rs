//! Spawn and stairs placement helpers.

use crate::map::Map;
use crate::room::Room;
use crate::types::{Pos, TileKind};

use super::model::MapKind;

/// First Floor cell in row-major order, or the map centre when there is none.
pub fn find_safe_spawn_point(map: &Map) -> Pos {
    map.find_first(TileKind::Floor).unwrap_or_else(|| map.center())
}

/// First stairs cell of either direction.
pub fn find_stairs(map: &Map) -> Option<Pos> {
    map.positions().find(|&pos| map.tile(pos).is_stairs())
}

pub fn place_stairs(map: &mut Map, pos: Pos) -> bool {
    if !map.in_bounds(pos) {
        return false;
    }
    map.set_tile(pos, TileKind::StairsDown);
    true
}

/// Hand-picked spawn for the fixed layouts on a default-sized map.
pub fn default_spawn_point(kind: MapKind) -> Pos {
    match kind {
        MapKind::TestDungeon => Pos::new(30, 16),
        MapKind::CorridorTest => Pos::new(10, 10),
        MapKind::CombatArena => Pos::new(40, 14),
        MapKind::TestRoom | MapKind::StressTest | MapKind::Procedural => Pos::new(99, 33),
    }
}

/// Where the viewer starts on a generated map.
/// Procedural maps start in the entrance room; fixed maps use their literal spawn if walkable.
pub fn spawn_point_for(map: &Map, kind: MapKind) -> Pos {
    let preferred = match kind {
        MapKind::Procedural | MapKind::StressTest => map.room(0).map(Room::center),
        _ => Some(default_spawn_point(kind)),
    };
    preferred
        .filter(|&pos| map.in_bounds(pos) && map.is_walkable(pos))
        .unwrap_or_else(|| find_safe_spawn_point(map))
}

/// Floor cell closest to `desired`; ties go to the lowest `y`, then `x`.
pub(super) fn nearest_walkable_floor_tile(map: &Map, desired: Pos) -> Option<Pos> {
    if map.tile(desired) == TileKind::Floor {
        return Some(desired);
    }
    map.positions()
        .filter(|&pos| map.tile(pos) == TileKind::Floor)
        .min_by_key(|&pos| (pos.manhattan(desired), pos))
}

/// Floor cell farthest from `entry`; ties go to the highest `y`, then `x`.
pub(super) fn farthest_walkable_tile_from_entry(map: &Map, entry: Pos) -> Option<Pos> {
    map.positions()
        .filter(|&pos| map.tile(pos) == TileKind::Floor && pos != entry)
        .max_by_key(|&pos| (pos.manhattan(entry), pos))
}

/// Down stairs go at the centre of the last room, or as far as possible from the entrance when
/// the entrance is the only room.
pub(super) fn choose_stairs_location(map: &Map, rooms: &[Room]) -> Option<Pos> {
    let last = rooms.last()?;
    if rooms.len() == 1 {
        return farthest_walkable_tile_from_entry(map, last.center());
    }
    nearest_walkable_floor_tile(map, last.center())
}

/// Matches the previous level's down stairs: the nearest Floor cell to `near` becomes up stairs.
pub fn place_up_stairs(map: &mut Map, near: Pos) -> Option<Pos> {
    let pos = nearest_walkable_floor_tile(map, near)?;
    map.set_tile(pos, TileKind::StairsUp);
    Some(pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::rooms::carve_room;

    fn sparse_floor() -> Map {
        let mut map = Map::new(7, 7);
        map.fill(TileKind::Wall);
        map.set_tile(Pos::new(3, 2), TileKind::Floor);
        map.set_tile(Pos::new(2, 3), TileKind::Floor);
        map
    }

    #[test]
    fn nearest_floor_prefers_lowest_y_then_x_for_tie_breaks() {
        let map = sparse_floor();
        assert_eq!(nearest_walkable_floor_tile(&map, Pos::new(1, 1)), Some(Pos::new(3, 2)));
    }

    #[test]
    fn safe_spawn_falls_back_to_centre() {
        let map = sparse_floor();
        assert_eq!(find_safe_spawn_point(&map), Pos::new(3, 2));
        let empty = Map::new(10, 8);
        assert_eq!(find_safe_spawn_point(&empty), Pos::new(5, 4));
    }

    #[test]
    fn stairs_lookup_finds_either_direction() {
        let mut map = sparse_floor();
        assert_eq!(find_stairs(&map), None);
        assert!(place_stairs(&mut map, Pos::new(2, 3)));
        assert_eq!(find_stairs(&map), Some(Pos::new(2, 3)));
        assert!(!place_stairs(&mut map, Pos::new(9, 9)));
    }

    #[test]
    fn up_stairs_land_on_the_nearest_floor() {
        let mut map = sparse_floor();
        assert_eq!(place_up_stairs(&mut map, Pos::new(1, 4)), Some(Pos::new(2, 3)));
        assert_eq!(map.tile(Pos::new(2, 3)), TileKind::StairsUp);

        let mut walls = Map::new(4, 4);
        walls.fill(TileKind::Wall);
        assert_eq!(place_up_stairs(&mut walls, Pos::new(1, 1)), None);
    }

    #[test]
    fn fixed_spawn_is_rejected_when_not_walkable() {
        let map = sparse_floor();
        assert_eq!(spawn_point_for(&map, MapKind::CombatArena), Pos::new(3, 2));
    }

    #[test]
    fn single_room_puts_stairs_away_from_its_centre() {
        let mut map = Map::new(12, 12);
        let room = Room::new(1, 1, 8, 6);
        carve_room(&mut map, &room);
        let stairs = choose_stairs_location(&map, &[room]);
        assert_eq!(stairs, Some(Pos::new(2, 2)));
        assert_ne!(stairs, Some(room.center()));
    }
}
