//! Hand-authored development layouts with literal coordinates.

use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};

use crate::map::Map;
use crate::room::{Room, RoomType};
use crate::types::{EAST, NORTH, Pos, SOUTH, TileKind, WEST};

use super::corridors::carve_corridor_l;
use super::model::MapKind;
use super::rooms::carve_room;
use super::seed::random_i32;

const STRESS_TEST_SEED: u64 = 12_345;
const STRESS_TEST_TRIES: usize = 50;
const TEST_ROOM_SIZE: i32 = 20;
const RING_DISTANCE: i32 = 3;

fn add_carved_room(map: &mut Map, room: Room) {
    carve_room(map, &room);
    map.add_room(room);
}

/// Floor along `cells`, with Void neighbours across the run turned into Wall.
fn carve_walled_run(map: &mut Map, cells: impl IntoIterator<Item = Pos>, horizontal: bool) {
    let (side_a, side_b) = if horizontal { (NORTH, SOUTH) } else { (WEST, EAST) };
    for cell in cells {
        map.set_tile(cell, TileKind::Floor);
        for side in [cell + side_a, cell + side_b] {
            if map.tile(side) == TileKind::Void {
                map.set_tile(side, TileKind::Wall);
            }
        }
    }
}

/// A centred room wrapped by a ring corridor, joined through open doors on all four sides.
pub fn generate_test_room(map: &mut Map) {
    map.reset();
    let width = TEST_ROOM_SIZE.min(map.width() as i32 - 4);
    let height = TEST_ROOM_SIZE.min(map.height() as i32 - 4);
    let room_x = (map.width() as i32 - width) / 2;
    let room_y = (map.height() as i32 - height) / 2;
    let room = Room::new(room_x, room_y, width, height).with_type(RoomType::Entrance);
    add_carved_room(map, room);

    let outer_left = room_x - RING_DISTANCE;
    let outer_right = room_x + width + RING_DISTANCE - 1;
    let outer_top = room_y - RING_DISTANCE;
    let outer_bottom = room_y + height + RING_DISTANCE - 1;
    for x in outer_left..=outer_right {
        map.set_tile(Pos { y: outer_top, x }, TileKind::Floor);
        map.set_tile(Pos { y: outer_bottom, x }, TileKind::Floor);
    }
    for y in outer_top..=outer_bottom {
        map.set_tile(Pos { y, x: outer_left }, TileKind::Floor);
        map.set_tile(Pos { y, x: outer_right }, TileKind::Floor);
    }

    let doors = [
        (Pos::new(room_x + width / 2, room_y), NORTH),
        (Pos::new(room_x + width / 2, room_y + height - 1), SOUTH),
        (Pos::new(room_x, room_y + height / 2), WEST),
        (Pos::new(room_x + width - 1, room_y + height / 2), EAST),
    ];
    for (door, outward) in doors {
        map.set_tile(door, TileKind::DoorOpen);
        let mut cell = door;
        for _ in 1..RING_DISTANCE {
            cell = cell + outward;
            map.set_tile(cell, TileKind::Floor);
        }
    }

    map.set_tile(Pos::new(room_x + width - 2, room_y + height - 2), TileKind::StairsDown);
}

/// Four rooms around a central hub.
pub fn generate_test_dungeon(map: &mut Map) {
    map.reset();
    add_carved_room(map, Room::new(10, 5, 20, 10));
    add_carved_room(map, Room::new(35, 5, 20, 10));
    add_carved_room(map, Room::new(10, 18, 20, 10));
    add_carved_room(map, Room::new(35, 18, 25, 10).with_type(RoomType::Treasure));
    add_carved_room(map, Room::new(22, 10, 16, 12).with_type(RoomType::Entrance));

    carve_corridor_l(map, Pos::new(29, 10), Pos::new(35, 10));
    carve_corridor_l(map, Pos::new(29, 23), Pos::new(35, 23));
    carve_corridor_l(map, Pos::new(20, 14), Pos::new(30, 21));
    carve_corridor_l(map, Pos::new(45, 14), Pos::new(37, 21));
    carve_corridor_l(map, Pos::new(30, 15), Pos::new(30, 18));

    let stairs_x = 55.min(map.width() as i32 - 5);
    let stairs_y = 22.min(map.height() as i32 - 2);
    map.set_tile(Pos::new(stairs_x, stairs_y), TileKind::StairsDown);
}

/// Two rooms joined by long one-wide corridors, plus a dead-end spur.
pub fn generate_corridor_test(map: &mut Map) {
    map.reset();
    add_carved_room(map, Room::new(5, 5, 10, 10).with_type(RoomType::Entrance));
    add_carved_room(map, Room::new(65, 15, 10, 8));

    carve_walled_run(map, (13..=65).map(|x| Pos::new(x, 10)), true);
    carve_walled_run(map, (10..=16).map(|y| Pos::new(65, y)), false);
    carve_walled_run(map, (10..20).map(|x| Pos::new(x, 20)), true);
    carve_walled_run(map, (14..=20).map(|y| Pos::new(10, y)), false);

    map.set_tile(Pos::new(70, 19), TileKind::StairsDown);
}

/// One large open room with four pillars.
pub fn generate_combat_arena(map: &mut Map) {
    map.reset();
    add_carved_room(map, Room::new(20, 5, 40, 18).with_type(RoomType::Boss));
    for pillar in [Pos::new(30, 10), Pos::new(30, 18), Pos::new(50, 10), Pos::new(50, 18)] {
        map.set_tile(pillar, TileKind::Wall);
    }
    map.set_tile(Pos::new(58, 21), TileKind::StairsDown);
}

/// Many rooms from a fixed seed, chained in placement order.
pub fn generate_stress_test(map: &mut Map) {
    map.reset();
    let width = map.width() as i32;
    let height = map.height() as i32;
    if width < 17 || height < 17 {
        return;
    }

    let mut rng = ChaCha8Rng::seed_from_u64(STRESS_TEST_SEED);
    let mut rooms: Vec<Room> = Vec::new();
    for _ in 0..STRESS_TEST_TRIES {
        let room_width = random_i32(&mut rng, 4, 12);
        let room_height = random_i32(&mut rng, 4, 12);
        let x = random_i32(&mut rng, 2, width - 15);
        let y = random_i32(&mut rng, 2, height - 15);
        if x + room_width >= width - 1 || y + room_height >= height - 1 {
            continue;
        }
        let candidate = Room::new(x, y, room_width, room_height);
        if rooms.iter().any(|room| candidate.overlaps(room, 0)) {
            continue;
        }
        add_carved_room(map, candidate);
        rooms.push(candidate);
    }

    for pair in rooms.windows(2) {
        carve_corridor_l(map, pair[0].center(), pair[1].center());
    }
    if let Some(last) = rooms.last() {
        map.set_tile(last.center(), TileKind::StairsDown);
    }
}

/// Builds the literal layout for `kind`. Returns false for procedural maps, which are not fixed.
pub fn generate_fixed(map: &mut Map, kind: MapKind) -> bool {
    match kind {
        MapKind::TestRoom => generate_test_room(map),
        MapKind::TestDungeon => generate_test_dungeon(map),
        MapKind::CorridorTest => generate_corridor_test(map),
        MapKind::CombatArena => generate_combat_arena(map),
        MapKind::StressTest => generate_stress_test(map),
        MapKind::Procedural => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
    use crate::mapgen::stairs::{default_spawn_point, spawn_point_for};

    fn default_map() -> Map {
        Map::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    #[test]
    fn test_room_is_centred_with_open_doors_and_stairs() {
        let mut map = default_map();
        generate_test_room(&mut map);

        let room = map.rooms()[0];
        assert_eq!((room.x, room.y, room.width, room.height), (89, 23, 20, 20));
        assert_eq!(map.tile(Pos::new(99, 23)), TileKind::DoorOpen);
        assert_eq!(map.tile(Pos::new(89, 33)), TileKind::DoorOpen);
        assert_eq!(map.tile(Pos::new(99, 20)), TileKind::Floor, "ring corridor");
        assert_eq!(map.tile(Pos::new(107, 41)), TileKind::StairsDown);
        assert_eq!(map.count(TileKind::StairsDown), 1);
        assert!(map.is_walkable(default_spawn_point(MapKind::TestRoom)));
    }

    #[test]
    fn literal_spawns_are_walkable_on_default_maps() {
        for kind in [MapKind::TestDungeon, MapKind::CorridorTest, MapKind::CombatArena] {
            let mut map = default_map();
            assert!(generate_fixed(&mut map, kind));
            let literal = default_spawn_point(kind);
            assert!(map.is_walkable(literal), "{kind} spawn {literal:?}\n{}", map.render_ascii());
            assert_eq!(spawn_point_for(&map, kind), literal);
            assert_eq!(map.count(TileKind::StairsDown), 1, "{kind}");
        }
    }

    #[test]
    fn combat_arena_has_pillars() {
        let mut map = default_map();
        generate_combat_arena(&mut map);
        for pillar in [Pos::new(30, 10), Pos::new(30, 18), Pos::new(50, 10), Pos::new(50, 18)] {
            assert_eq!(map.tile(pillar), TileKind::Wall);
        }
        assert_eq!(map.tile(Pos::new(58, 21)), TileKind::StairsDown);
    }

    #[test]
    fn corridor_test_runs_are_enclosed() {
        let mut map = default_map();
        generate_corridor_test(&mut map);
        assert_eq!(map.tile(Pos::new(40, 10)), TileKind::Floor);
        assert_eq!(map.tile(Pos::new(40, 9)), TileKind::Wall);
        assert_eq!(map.tile(Pos::new(40, 11)), TileKind::Wall);
        assert_eq!(map.tile(Pos::new(70, 19)), TileKind::StairsDown);
    }

    #[test]
    fn stress_test_is_reproducible_and_populated() {
        let mut first = default_map();
        let mut second = default_map();
        generate_stress_test(&mut first);
        generate_stress_test(&mut second);
        assert_eq!(first.fingerprint(), second.fingerprint());
        assert!(first.rooms().len() > 5);
        assert_eq!(first.count(TileKind::StairsDown), 1);
    }

    #[test]
    fn procedural_is_not_a_fixed_layout() {
        let mut map = default_map();
        assert!(!generate_fixed(&mut map, MapKind::Procedural));
    }
}
