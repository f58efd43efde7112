//! Which room pairs get a corridor. Every strategy returns index pairs into the room list and
//! links all rooms into one graph.

use rand_chacha::ChaCha8Rng;

use crate::room::Room;

use super::model::ConnectionStrategy;
use super::seed::{random_index, random_unit, shuffle};

const RANDOM_CANDIDATES: usize = 3;
const LOOP_EDGE_CHANCE: f64 = 0.15;

pub fn sequential_connections(rooms: &[Room]) -> Vec<(usize, usize)> {
    (1..rooms.len()).map(|idx| (idx - 1, idx)).collect()
}

/// Each room, in placement order, joins its nearest predecessor by centre distance.
pub fn nearest_connections(rooms: &[Room]) -> Vec<(usize, usize)> {
    let mut connections = Vec::with_capacity(rooms.len().saturating_sub(1));
    for pending_index in 1..rooms.len() {
        let pending_center = rooms[pending_index].center();
        let nearest = (0..pending_index)
            .min_by_key(|&connected_index| {
                (rooms[connected_index].center().manhattan(pending_center), connected_index)
            })
            .unwrap_or(0);
        connections.push((nearest, pending_index));
    }
    connections
}

/// Prim's algorithm over Manhattan centre distance. Ties break on the lower connected index,
/// then the lower pending index, so the tree is stable for a given room list.
pub fn mst_connections(rooms: &[Room]) -> Vec<(usize, usize)> {
    if rooms.len() < 2 {
        return Vec::new();
    }

    let mut connections = Vec::with_capacity(rooms.len() - 1);
    let mut connected_room_indices = vec![0_usize];
    let mut pending_room_indices: Vec<usize> = (1..rooms.len()).collect();

    while !pending_room_indices.is_empty() {
        let mut best_choice: Option<(u32, usize, usize)> = None;
        for &connected_index in &connected_room_indices {
            let connected_center = rooms[connected_index].center();
            for &pending_index in &pending_room_indices {
                let distance = connected_center.manhattan(rooms[pending_index].center());
                let candidate = (distance, connected_index, pending_index);
                if best_choice.is_none_or(|best| candidate < best) {
                    best_choice = Some(candidate);
                }
            }
        }

        let Some((_, connected_index, pending_index)) = best_choice else {
            break;
        };
        connections.push((connected_index, pending_index));
        connected_room_indices.push(pending_index);
        pending_room_indices.retain(|&index| index != pending_index);
    }

    connections
}

/// Rooms join in shuffled order, each to a random pick among its nearest already-joined rooms.
/// Some rooms also get a second link, which adds loops.
pub fn random_connections(rooms: &[Room], rng: &mut ChaCha8Rng) -> Vec<(usize, usize)> {
    if rooms.len() < 2 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..rooms.len()).collect();
    shuffle(rng, &mut order);

    let mut connections = Vec::new();
    for (position, &room_index) in order.iter().enumerate().skip(1) {
        let center = rooms[room_index].center();
        let mut attached = order[..position].to_vec();
        attached.sort_by_key(|&other| (rooms[other].center().manhattan(center), other));
        attached.truncate(RANDOM_CANDIDATES);

        let first_pick = random_index(rng, attached.len());
        connections.push((attached[first_pick], room_index));

        if attached.len() > 1 && random_unit(rng) < LOOP_EDGE_CHANCE {
            let offset = 1 + random_index(rng, attached.len() - 1);
            let second_pick = (first_pick + offset) % attached.len();
            connections.push((attached[second_pick], room_index));
        }
    }
    connections
}

pub fn connections_for(
    strategy: ConnectionStrategy,
    rooms: &[Room],
    rng: &mut ChaCha8Rng,
) -> Vec<(usize, usize)> {
    match strategy {
        ConnectionStrategy::Sequential => sequential_connections(rooms),
        ConnectionStrategy::Nearest => nearest_connections(rooms),
        ConnectionStrategy::Mst => mst_connections(rooms),
        ConnectionStrategy::Random => random_connections(rooms, rng),
    }
}
