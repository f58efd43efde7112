//! Corridor carving. Path cells become Floor unless already traversable; Void cells next to the
//! path become Wall so corridors read as enclosed.

use rand_chacha::ChaCha8Rng;

use crate::map::Map;
use crate::types::{Pos, TileKind};

use super::model::CorridorStyle;
use super::seed::random_i32;

const ORGANIC_JITTER: i32 = 3;

fn carve_floor(map: &mut Map, pos: Pos) {
    if map.in_bounds(pos) && !map.is_traversable(pos) {
        map.set_tile(pos, TileKind::Floor);
    }
}

fn wall_if_void(map: &mut Map, pos: Pos) {
    if map.tile(pos) == TileKind::Void && map.in_bounds(pos) {
        map.set_tile(pos, TileKind::Wall);
    }
}

/// One-wide corridor: horizontal run along `start.y`, then vertical run along `end.x`.
pub fn carve_corridor_l(map: &mut Map, start: Pos, end: Pos) {
    let mut x = start.x;
    let mut y = start.y;

    while x != end.x {
        carve_floor(map, Pos { y, x });
        wall_if_void(map, Pos { y: y - 1, x });
        wall_if_void(map, Pos { y: y + 1, x });
        x += (end.x - x).signum();
    }

    while y != end.y {
        carve_floor(map, Pos { y, x });
        wall_if_void(map, Pos { y, x: x - 1 });
        wall_if_void(map, Pos { y, x: x + 1 });
        y += (end.y - y).signum();
    }

    carve_floor(map, end);

    // Close the outside of the bend.
    let bend = Pos { y: start.y, x: end.x };
    let dx = (end.x - start.x).signum();
    let dy = (end.y - start.y).signum();
    if dx != 0 {
        wall_if_void(map, Pos { y: bend.y, x: bend.x + dx });
        if dy != 0 {
            wall_if_void(map, Pos { y: bend.y - dy, x: bend.x });
            wall_if_void(map, Pos { y: bend.y - dy, x: bend.x + dx });
        }
    }
}

/// Bresenham cells from `start` to `end`, both inclusive. Diagonal steps are split in two so
/// the line stays 4-connected.
fn bresenham(start: Pos, end: Pos) -> Vec<Pos> {
    let dx = (end.x - start.x).abs();
    let dy = (end.y - start.y).abs();
    let sx = if start.x < end.x { 1 } else { -1 };
    let sy = if start.y < end.y { 1 } else { -1 };
    let mut err = dx - dy;

    let mut points = Vec::with_capacity((dx + dy + 1) as usize);
    let mut current = start;
    loop {
        points.push(current);
        if current == end {
            break;
        }
        let e2 = 2 * err;
        let step_x = e2 > -dy;
        let step_y = e2 < dx;
        if step_x {
            err -= dy;
            current.x += sx;
        }
        if step_x && step_y {
            points.push(current);
        }
        if step_y {
            err += dx;
            current.y += sy;
        }
    }
    points
}

/// Direct line with a `width`×`width` brush, then a wall ring around the brush wherever it
/// was Void.
pub fn carve_corridor_straight(map: &mut Map, start: Pos, end: Pos, width: i32) {
    let width = width.max(1);
    let path = bresenham(start, end);

    for &cell in &path {
        for oy in 0..width {
            for ox in 0..width {
                carve_floor(map, Pos { y: cell.y + oy, x: cell.x + ox });
            }
        }
    }

    for &cell in &path {
        for oy in -1..=width {
            for ox in -1..=width {
                if ox == -1 || ox == width || oy == -1 || oy == width {
                    wall_if_void(map, Pos { y: cell.y + oy, x: cell.x + ox });
                }
            }
        }
    }
}

/// Two bends at the horizontal midpoint.
pub fn carve_corridor_s(map: &mut Map, start: Pos, end: Pos, width: i32) {
    let mid_x = (start.x + end.x) / 2;
    let bend1 = Pos { y: start.y, x: mid_x };
    let bend2 = Pos { y: end.y, x: mid_x };
    carve_corridor_straight(map, start, bend1, width);
    carve_corridor_straight(map, bend1, bend2, width);
    carve_corridor_straight(map, bend2, end, width);
}

/// Winds through two to four jittered waypoints spaced along the segment.
pub fn carve_corridor_organic(
    map: &mut Map,
    rng: &mut ChaCha8Rng,
    start: Pos,
    end: Pos,
    width: i32,
) {
    let waypoint_count = random_i32(rng, 2, 4);
    let max_x = (map.width() as i32 - 2).max(1);
    let max_y = (map.height() as i32 - 2).max(1);

    let mut previous = start;
    for step in 1..=waypoint_count {
        let base_x = start.x + (end.x - start.x) * step / (waypoint_count + 1);
        let base_y = start.y + (end.y - start.y) * step / (waypoint_count + 1);
        let jitter_x = random_i32(rng, -ORGANIC_JITTER, ORGANIC_JITTER);
        let jitter_y = random_i32(rng, -ORGANIC_JITTER, ORGANIC_JITTER);
        let waypoint =
            Pos { y: (base_y + jitter_y).clamp(1, max_y), x: (base_x + jitter_x).clamp(1, max_x) };
        carve_segment(map, previous, waypoint, width);
        previous = waypoint;
    }
    carve_segment(map, previous, end, width);
}

fn carve_segment(map: &mut Map, start: Pos, end: Pos, width: i32) {
    if width <= 1 {
        carve_corridor_l(map, start, end);
    } else {
        let bend = Pos { y: start.y, x: end.x };
        carve_corridor_straight(map, start, bend, width);
        carve_corridor_straight(map, bend, end, width);
    }
}

/// Dispatches on the corridor style. Only the organic style draws from `rng`.
pub fn carve_corridor(
    map: &mut Map,
    rng: &mut ChaCha8Rng,
    start: Pos,
    end: Pos,
    style: CorridorStyle,
    width: i32,
) {
    match style {
        CorridorStyle::Straight => carve_corridor_straight(map, start, end, width),
        CorridorStyle::LShaped => carve_segment(map, start, end, width),
        CorridorStyle::SShaped => carve_corridor_s(map, start, end, width),
        CorridorStyle::Organic => carve_corridor_organic(map, rng, start, end, width),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, VecDeque};

    use rand_chacha::rand_core::SeedableRng;

    use super::*;

    fn connected(map: &Map, from: Pos, to: Pos) -> bool {
        let mut open = VecDeque::from([from]);
        let mut seen = BTreeSet::from([from]);
        while let Some(pos) = open.pop_front() {
            if pos == to {
                return true;
            }
            for next in pos.neighbors4() {
                if map.is_traversable(next) && seen.insert(next) {
                    open.push_back(next);
                }
            }
        }
        false
    }

    #[test]
    fn l_corridor_runs_horizontal_then_vertical_with_flanking_walls() {
        let mut map = Map::new(20, 20);
        carve_corridor_l(&mut map, Pos::new(2, 3), Pos::new(8, 10));

        assert_eq!(map.tile(Pos::new(5, 3)), TileKind::Floor);
        assert_eq!(map.tile(Pos::new(8, 3)), TileKind::Floor, "bend cell");
        assert_eq!(map.tile(Pos::new(8, 7)), TileKind::Floor);
        assert_eq!(map.tile(Pos::new(8, 10)), TileKind::Floor);
        assert_eq!(map.tile(Pos::new(5, 2)), TileKind::Wall);
        assert_eq!(map.tile(Pos::new(5, 4)), TileKind::Wall);
        assert_eq!(map.tile(Pos::new(7, 7)), TileKind::Wall);
        assert_eq!(map.tile(Pos::new(9, 7)), TileKind::Wall);
        assert_eq!(map.tile(Pos::new(9, 3)), TileKind::Wall, "outside of the bend");
        assert_eq!(map.tile(Pos::new(9, 2)), TileKind::Wall, "bend corner");
        assert!(connected(&map, Pos::new(2, 3), Pos::new(8, 10)));
    }

    #[test]
    fn carving_keeps_existing_traversable_tiles() {
        let mut map = Map::new(20, 10);
        map.set_tile(Pos::new(5, 4), TileKind::StairsDown);
        map.set_tile(Pos::new(7, 4), TileKind::DoorClosed);
        map.set_tile(Pos::new(9, 4), TileKind::Wall);
        carve_corridor_l(&mut map, Pos::new(2, 4), Pos::new(12, 4));

        assert_eq!(map.tile(Pos::new(5, 4)), TileKind::StairsDown);
        assert_eq!(map.tile(Pos::new(7, 4)), TileKind::DoorClosed);
        assert_eq!(map.tile(Pos::new(9, 4)), TileKind::Floor, "walls on the path open up");
    }

    #[test]
    fn bresenham_line_is_four_connected_and_inclusive() {
        let points = bresenham(Pos::new(1, 1), Pos::new(9, 4));
        assert_eq!(points.first(), Some(&Pos::new(1, 1)));
        assert_eq!(points.last(), Some(&Pos::new(9, 4)));
        assert_eq!(points.len(), 8 + 3 + 1);
        for pair in points.windows(2) {
            assert_eq!(pair[0].manhattan(pair[1]), 1, "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn wide_straight_corridor_uses_square_brush() {
        let mut map = Map::new(30, 15);
        carve_corridor_straight(&mut map, Pos::new(3, 5), Pos::new(20, 5), 3);
        for y in 5..8 {
            assert_eq!(map.tile(Pos::new(10, y)), TileKind::Floor);
        }
        assert_eq!(map.tile(Pos::new(10, 4)), TileKind::Wall);
        assert_eq!(map.tile(Pos::new(10, 8)), TileKind::Wall);
        assert_eq!(map.tile(Pos::new(2, 6)), TileKind::Wall);
    }

    #[test]
    fn every_style_connects_its_endpoints() {
        let start = Pos::new(4, 4);
        let end = Pos::new(40, 22);
        for style in CorridorStyle::ALL {
            for width in [1, 2] {
                let mut map = Map::new(50, 30);
                let mut rng = ChaCha8Rng::seed_from_u64(5);
                carve_corridor(&mut map, &mut rng, start, end, style, width);
                assert!(
                    connected(&map, start, end),
                    "{style} width {width} should connect\n{}",
                    map.render_ascii()
                );
            }
        }
    }

    #[test]
    fn organic_corridor_is_deterministic_per_rng_seed() {
        let carve = |seed| {
            let mut map = Map::new(60, 30);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            carve_corridor_organic(&mut map, &mut rng, Pos::new(3, 3), Pos::new(55, 25), 1);
            map.fingerprint()
        };
        assert_eq!(carve(11), carve(11));
    }

    #[test]
    fn corridors_never_write_out_of_bounds() {
        let mut map = Map::new(10, 10);
        carve_corridor_straight(&mut map, Pos::new(0, 0), Pos::new(9, 9), 3);
        carve_corridor_l(&mut map, Pos::new(0, 9), Pos::new(9, 0));
        assert_eq!(map.positions().count(), 100);
    }
}
