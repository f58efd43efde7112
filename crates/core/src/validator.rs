//! Playability checks over a finished grid, plus the repair passes that bridge disconnected
//! regions. Connectivity runs over traversable cells: walkable tiles and closed doors.

use std::collections::{BTreeSet, VecDeque};

use serde::Serialize;
use tracing::{Level, event};

use crate::map::Map;
use crate::mapgen::corridors::carve_corridor_l;
use crate::types::{Pos, TileKind};

/// Below this many reachable cells a repaired level is rejected.
pub const MIN_PLAYABLE_TILES: usize = 50;
pub const FEW_WALKABLE_TILES: usize = 20;
pub const MIN_WALL_RATIO: f64 = 0.1;
pub const MAX_WALL_RATIO: f64 = 0.8;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Connected regions, counted by flood fill.
    pub room_count: usize,
    pub walkable_tiles: usize,
    pub wall_tiles: usize,
    pub void_tiles: usize,
    pub has_stairs_down: bool,
    pub has_stairs_up: bool,
    pub has_spawn_point: bool,
    pub is_connected: bool,
}

impl ValidationResult {
    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectivityResult {
    pub total_floor_tiles: usize,
    /// Components in discovery order (row-major scan of their first cell).
    pub components: Vec<BTreeSet<Pos>>,
    pub num_components: usize,
    pub largest_component: BTreeSet<Pos>,
    /// Every cell outside the largest component.
    pub unreachable_tiles: BTreeSet<Pos>,
    pub reachable_floor_tiles: usize,
    pub is_fully_connected: bool,
}

impl ConnectivityResult {
    /// Share of traversable cells inside the largest component; 1.0 for an empty grid.
    pub fn connectivity_ratio(&self) -> f64 {
        if self.total_floor_tiles == 0 {
            return 1.0;
        }
        self.reachable_floor_tiles as f64 / self.total_floor_tiles as f64
    }
}

/// What a repair pass did to the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub success: bool,
    pub components_before: usize,
    pub components_after: usize,
    pub bridges_carved: usize,
    pub reachable_tiles: usize,
}

fn cell_index(map: &Map, pos: Pos) -> usize {
    pos.y as usize * map.width() + pos.x as usize
}

fn flood_from(map: &Map, start: Pos, visited: &mut [bool]) -> BTreeSet<Pos> {
    let mut component = BTreeSet::new();
    if !map.is_traversable(start) || visited[cell_index(map, start)] {
        return component;
    }

    let mut queue = VecDeque::new();
    visited[cell_index(map, start)] = true;
    component.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for neighbor in current.neighbors4() {
            if !map.is_traversable(neighbor) {
                continue;
            }
            let idx = cell_index(map, neighbor);
            if !visited[idx] {
                visited[idx] = true;
                component.insert(neighbor);
                queue.push_back(neighbor);
            }
        }
    }

    component
}

/// Every traversable cell reachable from `from` by 4-directional steps.
pub fn reachable_tiles(map: &Map, from: Pos) -> BTreeSet<Pos> {
    let mut visited = vec![false; map.width() * map.height()];
    flood_from(map, from, &mut visited)
}

pub fn is_reachable(map: &Map, from: Pos, to: Pos) -> bool {
    if !map.is_traversable(from) || !map.is_traversable(to) {
        return false;
    }
    from == to || reachable_tiles(map, from).contains(&to)
}

pub fn find_walkable_tile(map: &Map) -> Option<Pos> {
    map.positions().find(|&pos| map.is_walkable(pos))
}

pub fn count_walkable_tiles(map: &Map) -> usize {
    map.positions().filter(|&pos| map.is_walkable(pos)).count()
}

/// Walls plus closed doors.
pub fn count_wall_tiles(map: &Map) -> usize {
    map.count(TileKind::Wall) + map.count(TileKind::DoorClosed)
}

pub fn count_rooms(map: &Map) -> usize {
    find_all_components(map).len()
}

pub fn has_stairs(map: &Map) -> bool {
    map.positions().any(|pos| map.tile(pos).is_stairs())
}

/// A single flood fill from the first traversable cell reaches every traversable cell.
pub fn check_connectivity(map: &Map) -> bool {
    let Some(start) = map.positions().find(|&pos| map.is_traversable(pos)) else {
        return true;
    };
    let total = map.positions().filter(|&pos| map.is_traversable(pos)).count();
    reachable_tiles(map, start).len() == total
}

pub fn find_all_components(map: &Map) -> Vec<BTreeSet<Pos>> {
    let mut visited = vec![false; map.width() * map.height()];
    let mut components = Vec::new();
    for pos in map.positions() {
        let component = flood_from(map, pos, &mut visited);
        if !component.is_empty() {
            components.push(component);
        }
    }
    components
}

/// Index of the largest component; the earliest one wins ties.
fn largest_index(components: &[BTreeSet<Pos>]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, component) in components.iter().enumerate() {
        if best.is_none_or(|best_idx| component.len() > components[best_idx].len()) {
            best = Some(idx);
        }
    }
    best
}

pub fn check_advanced_connectivity(map: &Map) -> ConnectivityResult {
    let components = find_all_components(map);
    let total_floor_tiles = components.iter().map(BTreeSet::len).sum();
    let largest = largest_index(&components);

    let largest_component = largest.map(|idx| components[idx].clone()).unwrap_or_default();
    let unreachable_tiles = components
        .iter()
        .enumerate()
        .filter(|&(idx, _)| Some(idx) != largest)
        .flat_map(|(_, component)| component.iter().copied())
        .collect();

    ConnectivityResult {
        total_floor_tiles,
        num_components: components.len(),
        reachable_floor_tiles: largest_component.len(),
        is_fully_connected: components.len() <= 1,
        largest_component,
        unreachable_tiles,
        components,
    }
}

/// Cells of `component` with at least one non-traversable neighbour. The closest pair between
/// two components always lies on their boundaries.
fn boundary(map: &Map, component: &BTreeSet<Pos>) -> Vec<Pos> {
    component
        .iter()
        .copied()
        .filter(|pos| pos.neighbors4().iter().any(|&next| !map.is_traversable(next)))
        .collect()
}

/// Pair of cells, one from each set, with the smallest Manhattan distance. Ties go to the
/// earliest cell of `from`, then of `to`.
pub fn find_closest_points(
    map: &Map,
    from: &BTreeSet<Pos>,
    to: &BTreeSet<Pos>,
) -> Option<(Pos, Pos, u32)> {
    let from_edge = boundary(map, from);
    let to_edge = boundary(map, to);
    let mut best: Option<(Pos, Pos, u32)> = None;
    for &a in &from_edge {
        for &b in &to_edge {
            let distance = a.manhattan(b);
            if best.is_none_or(|(_, _, best_distance)| distance < best_distance) {
                best = Some((a, b, distance));
            }
        }
    }
    best
}

/// Bridges the largest component to its nearest neighbour until one component remains.
/// Returns the number of corridors carved.
pub fn connect_components(map: &mut Map) -> usize {
    let initial = find_all_components(map).len();
    let mut bridges = 0;

    for _ in 1..initial {
        let components = find_all_components(map);
        let Some(largest) = largest_index(&components) else {
            break;
        };
        if components.len() <= 1 {
            break;
        }

        let mut nearest: Option<(Pos, Pos, u32)> = None;
        for (idx, other) in components.iter().enumerate() {
            if idx == largest {
                continue;
            }
            let Some(candidate) = find_closest_points(map, &components[largest], other) else {
                continue;
            };
            if nearest.is_none_or(|(_, _, best)| candidate.2 < best) {
                nearest = Some(candidate);
            }
        }

        let Some((from, to, distance)) = nearest else {
            break;
        };
        event!(Level::DEBUG, ?from, ?to, distance, "bridging disconnected components");
        carve_corridor_l(map, from, to);
        bridges += 1;
    }

    bridges
}

/// Every down and up stairs cell, in row-major order.
pub fn stairs_tiles(map: &Map) -> Vec<Pos> {
    map.positions().filter(|&pos| map.tile(pos).is_stairs()).collect()
}

/// Makes sure every stairs cell shares a component with `spawn`, carving one bridge per stranded
/// stairs cell. A map without stairs has nothing to reach and counts as reachable.
pub fn ensure_stairs_reachable(map: &mut Map, spawn: Pos) -> bool {
    let stairs = stairs_tiles(map);
    if stairs.is_empty() {
        return true;
    }
    if !map.is_traversable(spawn) {
        return false;
    }

    let mut spawn_area = reachable_tiles(map, spawn);
    for &target in &stairs {
        if spawn_area.contains(&target) {
            continue;
        }
        let stairs_area = reachable_tiles(map, target);
        if let Some((from, to, distance)) = find_closest_points(map, &spawn_area, &stairs_area) {
            event!(Level::DEBUG, ?from, ?to, ?target, distance, "bridging stairs to spawn area");
            carve_corridor_l(map, from, to);
            spawn_area = reachable_tiles(map, spawn);
        }
    }
    stairs.iter().all(|target| spawn_area.contains(target))
}

/// Spawn reference used by the validator: the first room's centre when it can be stood on,
/// otherwise the first walkable cell.
fn reference_spawn(map: &Map) -> Option<Pos> {
    map.room(0)
        .map(|room| room.center())
        .filter(|&pos| map.is_walkable(pos))
        .or_else(|| find_walkable_tile(map))
}

pub fn validate(map: &Map) -> ValidationResult {
    let mut result = ValidationResult {
        walkable_tiles: count_walkable_tiles(map),
        wall_tiles: count_wall_tiles(map),
        void_tiles: map.count(TileKind::Void),
        has_stairs_down: map.find_first(TileKind::StairsDown).is_some(),
        has_stairs_up: map.find_first(TileKind::StairsUp).is_some(),
        ..ValidationResult::default()
    };

    let spawn = reference_spawn(map);
    result.has_spawn_point = spawn.is_some();
    result.room_count = count_rooms(map);
    result.is_connected = check_connectivity(map);

    if result.walkable_tiles == 0 {
        result.error("map has no walkable tiles");
    }
    if !result.has_spawn_point {
        result.error("no valid spawn point");
    }
    if result.walkable_tiles > 0 && !result.is_connected {
        result.error(format!("map has {} disconnected regions", result.room_count));
    }
    if let Some(spawn) = spawn {
        let spawn_area = reachable_tiles(map, spawn);
        let stranded =
            stairs_tiles(map).into_iter().filter(|pos| !spawn_area.contains(pos)).count();
        if stranded > 0 {
            result.error(format!("{stranded} stairs tile(s) not reachable from the spawn point"));
        }
    }

    if result.walkable_tiles > 0 && result.walkable_tiles < FEW_WALKABLE_TILES {
        result.warning(format!("very few walkable tiles ({})", result.walkable_tiles));
    }
    if !result.has_stairs_down && !result.has_stairs_up {
        result.warning("no stairs on the map");
    }
    let total = (map.width() * map.height()).max(1);
    let wall_ratio = result.wall_tiles as f64 / total as f64;
    if wall_ratio < MIN_WALL_RATIO {
        result.warning(format!("wall ratio {:.1}% is unusually low", wall_ratio * 100.0));
    } else if wall_ratio > MAX_WALL_RATIO {
        result.warning(format!("wall ratio {:.1}% is unusually high", wall_ratio * 100.0));
    }
    if result.room_count == 0 {
        result.warning("no rooms detected");
    }

    result.valid = result.errors.is_empty();
    result
}

/// Repairs connectivity and stairs reachability in place. Running it on an already connected
/// grid changes nothing.
pub fn validate_and_fix_report(map: &mut Map, min_playable_tiles: usize) -> RepairReport {
    let components_before = find_all_components(map).len();
    let mut report = RepairReport { components_before, ..RepairReport::default() };
    if components_before == 0 {
        event!(Level::WARN, "repair skipped: no traversable tiles");
        return report;
    }

    if components_before > 1 {
        report.bridges_carved = connect_components(map);
    }
    let stairs_ok = match reference_spawn(map) {
        Some(spawn) => ensure_stairs_reachable(map, spawn),
        None => false,
    };

    let connectivity = check_advanced_connectivity(map);
    report.components_after = connectivity.num_components;
    report.reachable_tiles = connectivity.reachable_floor_tiles;
    report.success = connectivity.is_fully_connected
        && stairs_ok
        && connectivity.reachable_floor_tiles >= min_playable_tiles;

    if report.success {
        event!(
            Level::DEBUG,
            components_before,
            bridges = report.bridges_carved,
            reachable = report.reachable_tiles,
            "repair finished"
        );
    } else {
        event!(
            Level::WARN,
            components_before,
            components_after = report.components_after,
            reachable = report.reachable_tiles,
            min_playable_tiles,
            stairs_ok,
            "repair could not make the map playable"
        );
    }
    report
}

pub fn validate_and_fix(map: &mut Map) -> bool {
    validate_and_fix_report(map, MIN_PLAYABLE_TILES).success
}
