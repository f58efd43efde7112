//! Field-of-view over a tile grid.
//! Recursive shadowcasting over eight octants with a circular radius, followed by a
//! direct line-of-sight pass that drops cells only reachable around corners.
//! Opaque cells are visible themselves; anything out of bounds is opaque and never visible.

use std::collections::BTreeSet;

use tracing::{Level, event};

use crate::map::Map;
use crate::types::Pos;

/// Per-cell visibility result with the same dimensions as the map it was computed for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibilityGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl VisibilityGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, cells: vec![false; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn reset(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells.resize(width * height, false);
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        pos.in_bounds(self.width, self.height)
            .then(|| (pos.y as usize) * self.width + (pos.x as usize))
    }

    pub fn is_visible(&self, pos: Pos) -> bool {
        self.index(pos).is_some_and(|idx| self.cells[idx])
    }

    fn set(&mut self, pos: Pos, visible: bool) {
        if let Some(idx) = self.index(pos) {
            self.cells[idx] = visible;
        }
    }

    pub fn visible_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    /// Visible cells in row-major order.
    pub fn visible_points(&self) -> impl Iterator<Item = Pos> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell)
            .map(move |(idx, _)| Pos { y: (idx / width) as i32, x: (idx % width) as i32 })
    }
}

/// Clears `out` to the map's dimensions and marks every cell seen from `origin` within `radius`.
/// The origin is always visible when it is inside the map, even at radius 0.
pub fn calculate(map: &Map, origin: Pos, radius: i32, out: &mut VisibilityGrid) {
    out.reset(map.width(), map.height());
    if !map.in_bounds(origin) {
        return;
    }
    let radius = radius.max(0);
    out.set(origin, true);
    for octant in 0..8 {
        scan_octant(map, out, origin, radius, 1, Slope::new(1, 1), Slope::new(0, 1), octant);
    }

    let min_y = (origin.y - radius).max(0);
    let max_y = (origin.y + radius + 1).min(map.height() as i32);
    let min_x = (origin.x - radius).max(0);
    let max_x = (origin.x + radius + 1).min(map.width() as i32);

    for y in min_y..max_y {
        for x in min_x..max_x {
            let p = Pos { y, x };
            if p == origin || !out.is_visible(p) {
                continue;
            }
            if !has_direct_line_of_sight(map, origin, p) {
                out.set(p, false);
            }
        }
    }

    event!(Level::TRACE, ?origin, radius, visible = out.visible_count(), "fov calculated");
}

/// Squared-distance reject first, then a full calculation.
pub fn is_visible(map: &Map, origin: Pos, target: Pos, max_distance: i32) -> bool {
    if !map.in_bounds(target) {
        return false;
    }
    let max_distance = i64::from(max_distance.max(0));
    if origin.distance_squared(target) > max_distance * max_distance {
        return false;
    }
    let mut grid = VisibilityGrid::default();
    calculate(map, origin, max_distance as i32, &mut grid);
    grid.is_visible(target)
}

pub fn visible_tiles(map: &Map, origin: Pos, radius: i32) -> BTreeSet<Pos> {
    let mut grid = VisibilityGrid::default();
    calculate(map, origin, radius, &mut grid);
    grid.visible_points().collect()
}

fn transform_octant(orig: Pos, x: i32, y: i32, oct: u8) -> Pos {
    match oct {
        0 => Pos { y: orig.y - y, x: orig.x + x },
        1 => Pos { y: orig.y - x, x: orig.x + y },
        2 => Pos { y: orig.y - x, x: orig.x - y },
        3 => Pos { y: orig.y - y, x: orig.x - x },
        4 => Pos { y: orig.y + y, x: orig.x - x },
        5 => Pos { y: orig.y + x, x: orig.x - y },
        6 => Pos { y: orig.y + x, x: orig.x + y },
        7 => Pos { y: orig.y + y, x: orig.x + x },
        _ => orig,
    }
}

#[derive(Clone, Copy)]
struct Slope {
    y: i32,
    x: i32,
}

impl Slope {
    fn new(y: i32, x: i32) -> Self {
        Self { y, x }
    }

    fn greater_or_equal(&self, other: &Slope) -> bool {
        self.y * other.x >= other.y * self.x
    }

    fn greater_than(&self, other: &Slope) -> bool {
        self.y * other.x > other.y * self.x
    }
}

#[allow(clippy::too_many_arguments)]
fn scan_octant(
    map: &Map,
    out: &mut VisibilityGrid,
    orig: Pos,
    radius: i32,
    dist: i32,
    start: Slope,
    end: Slope,
    oct: u8,
) {
    if dist > radius {
        return;
    }
    let radius_squared = i64::from(radius) * i64::from(radius);
    let mut blocked = false;
    let mut cur_start = start;
    for y in (0..=dist).rev() {
        let top = Slope::new(2 * y + 1, 2 * dist - 1);
        let bot = Slope::new(2 * y - 1, 2 * dist + 1);
        if cur_start.greater_or_equal(&bot) && top.greater_than(&end) {
            let p = transform_octant(orig, dist, y, oct);
            if orig.distance_squared(p) <= radius_squared {
                out.set(p, true);
            }
            if !map.is_transparent(p) {
                if !blocked {
                    scan_octant(map, out, orig, radius, dist + 1, cur_start, top, oct);
                    blocked = true;
                }
                cur_start = bot;
            } else if blocked {
                blocked = false;
            }
        }
    }
    if !blocked {
        scan_octant(map, out, orig, radius, dist + 1, cur_start, end, oct);
    }
}

/// Walks the grid line from `origin` to `target`; every cell strictly between them must be
/// transparent.
fn has_direct_line_of_sight(map: &Map, origin: Pos, target: Pos) -> bool {
    let dx = target.x - origin.x;
    let dy = target.y - origin.y;
    let sx = dx.signum();
    let sy = dy.signum();
    let total_dist_x = dx.abs();
    let total_dist_y = dy.abs();

    let mut x = origin.x;
    let mut y = origin.y;
    let mut current_step_x = 0;
    let mut current_step_y = 0;

    while current_step_x < total_dist_x || current_step_y < total_dist_y {
        let lhs = (1 + 2 * current_step_x) * total_dist_y;
        let rhs = (1 + 2 * current_step_y) * total_dist_x;

        if lhs == rhs {
            x += sx;
            y += sy;
            current_step_x += 1;
            current_step_y += 1;
        } else if lhs < rhs {
            x += sx;
            current_step_x += 1;
        } else {
            y += sy;
            current_step_y += 1;
        }

        if x == target.x && y == target.y {
            break;
        }
        if !map.is_transparent(Pos { y, x }) {
            return false;
        }
    }
    true
}
