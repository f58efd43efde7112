//! Door placement where corridors break through room walls.

use crate::map::Map;
use crate::room::Room;
use crate::types::{EAST, NORTH, Pos, SOUTH, TileKind, WEST};

/// A Floor cell squeezed between two walls (above and below, or left and right) becomes a
/// closed door.
pub fn check_and_place_door(map: &mut Map, pos: Pos) -> bool {
    if map.tile(pos) != TileKind::Floor {
        return false;
    }
    let walled = |a: Pos, b: Pos| {
        map.in_bounds(a)
            && map.in_bounds(b)
            && map.tile(a) == TileKind::Wall
            && map.tile(b) == TileKind::Wall
    };
    let horizontal_door = walled(pos + NORTH, pos + SOUTH);
    let vertical_door = walled(pos + WEST, pos + EAST);
    if horizontal_door || vertical_door {
        map.set_tile(pos, TileKind::DoorClosed);
        return true;
    }
    false
}

/// Scans every room's wall ring (corners excluded) for doorway cells. Returns how many doors
/// were placed.
pub fn place_doors_at_room_entrances(map: &mut Map, rooms: &[Room]) -> usize {
    let mut placed = 0;
    for room in rooms {
        for pos in room.perimeter() {
            if !room.is_corner(pos) && check_and_place_door(map, pos) {
                placed += 1;
            }
        }
    }
    placed
}

fn outward(room: &Room, pos: Pos) -> Pos {
    if pos.y == room.top() {
        pos + NORTH
    } else if pos.y == room.bottom() {
        pos + SOUTH
    } else if pos.x == room.left() {
        pos + WEST
    } else {
        pos + EAST
    }
}

/// Wall-ring cells that are open and lead straight out into an open cell.
pub fn find_corridor_room_intersections(map: &Map, rooms: &[Room]) -> Vec<Pos> {
    let mut intersections = Vec::new();
    for room in rooms {
        for pos in room.perimeter() {
            if room.is_corner(pos) || !map.is_traversable(pos) {
                continue;
            }
            if map.is_traversable(outward(room, pos)) {
                intersections.push(pos);
            }
        }
    }
    intersections.sort();
    intersections.dedup();
    intersections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::corridors::carve_corridor_l;
    use crate::mapgen::rooms::carve_room;

    #[test]
    fn doorway_pattern_needs_walls_on_opposite_sides() {
        let mut map = Map::new(5, 5);
        map.fill(TileKind::Floor);
        map.set_tile(Pos::new(2, 1), TileKind::Wall);
        assert!(!check_and_place_door(&mut map, Pos::new(2, 2)));

        map.set_tile(Pos::new(2, 3), TileKind::Wall);
        assert!(check_and_place_door(&mut map, Pos::new(2, 2)));
        assert_eq!(map.tile(Pos::new(2, 2)), TileKind::DoorClosed);
        assert!(!check_and_place_door(&mut map, Pos::new(2, 2)), "only Floor converts");
    }

    #[test]
    fn map_edge_never_counts_as_a_wall() {
        let mut map = Map::new(3, 3);
        map.fill(TileKind::Wall);
        map.set_tile(Pos::new(0, 1), TileKind::Floor);
        assert!(check_and_place_door(&mut map, Pos::new(0, 1)), "walls above and below");

        let mut map = Map::new(3, 1);
        map.fill(TileKind::Wall);
        map.set_tile(Pos::new(0, 0), TileKind::Floor);
        assert!(!check_and_place_door(&mut map, Pos::new(0, 0)));
    }

    #[test]
    fn corridor_breaking_through_a_wall_gets_a_door() {
        let mut map = Map::new(30, 15);
        let left = Room::new(2, 2, 7, 7);
        let right = Room::new(18, 2, 7, 7);
        carve_room(&mut map, &left);
        carve_room(&mut map, &right);
        carve_corridor_l(&mut map, left.center(), right.center());

        let intersections = find_corridor_room_intersections(&map, &[left, right]);
        assert_eq!(intersections, vec![Pos::new(8, 5), Pos::new(18, 5)]);

        let placed = place_doors_at_room_entrances(&mut map, &[left, right]);
        assert_eq!(placed, 2);
        assert_eq!(map.tile(Pos::new(8, 5)), TileKind::DoorClosed);
        assert_eq!(map.tile(Pos::new(18, 5)), TileKind::DoorClosed);
        assert_eq!(map.tile(Pos::new(12, 5)), TileKind::Floor, "corridor interior stays open");
    }
}
