//! Room placement by bounded rejection sampling, and room carving.

use rand_chacha::ChaCha8Rng;
use tracing::{Level, event};

use crate::config::GeneratorConfig;
use crate::map::Map;
use crate::room::{Room, RoomType};
use crate::types::{Pos, TileKind};

use super::seed::{random_i32, random_unit};

/// The room fits with a one-tile margin to the map edge and its padded footprint is still Void.
pub fn can_place_room(map: &Map, room: &Room) -> bool {
    let width = map.width() as i32;
    let height = map.height() as i32;
    let inside_margin = room.x >= 1
        && room.y >= 1
        && room.x + room.width <= width - 2
        && room.y + room.height <= height - 2;
    if !inside_margin {
        return false;
    }

    let padded = room.expanded(1);
    for y in padded.top()..=padded.bottom() {
        for x in padded.left()..=padded.right() {
            if map.tile(Pos { y, x }) != TileKind::Void {
                return false;
            }
        }
    }
    true
}

/// Perimeter becomes Wall, interior becomes Floor.
pub fn carve_room(map: &mut Map, room: &Room) {
    for pos in room.perimeter() {
        map.set_tile(pos, TileKind::Wall);
    }
    for pos in room.floor_tiles() {
        map.set_tile(pos, TileKind::Floor);
    }
}

/// Places up to `max_rooms` rooms within `max_placement_attempts` tries, carving and registering
/// each accepted room. The first room is the entrance. Never leaves the map without a room when
/// an emergency room fits.
pub fn generate_random_rooms(
    map: &mut Map,
    rng: &mut ChaCha8Rng,
    config: &GeneratorConfig,
) -> Vec<Room> {
    let width = map.width() as i32;
    let height = map.height() as i32;
    let max_width = config.max_room_size.min(width - 3);
    let max_height = config.max_room_size.min(height - 3);

    let mut rooms: Vec<Room> = Vec::new();
    let mut attempts = 0_u32;
    let fits_at_all = max_width >= config.min_room_size && max_height >= config.min_room_size;

    while fits_at_all && rooms.len() < config.max_rooms && attempts < config.max_placement_attempts
    {
        attempts += 1;
        let room_width = random_i32(rng, config.min_room_size, max_width);
        let room_height = random_i32(rng, config.min_room_size, max_height);
        let x = random_i32(rng, 1, width - 2 - room_width);
        let y = random_i32(rng, 1, height - 2 - room_height);
        let lit = random_unit(rng) < config.lit_room_chance;

        let candidate = Room::new(x, y, room_width, room_height).with_lit(lit);
        if !candidate.is_valid() {
            continue;
        }
        if rooms.iter().any(|existing| candidate.overlaps(existing, config.room_padding)) {
            continue;
        }
        if !can_place_room(map, &candidate) {
            continue;
        }

        let candidate = if rooms.is_empty() {
            candidate.with_type(RoomType::Entrance)
        } else {
            candidate
        };
        carve_room(map, &candidate);
        map.add_room(candidate);
        rooms.push(candidate);
    }

    event!(Level::DEBUG, placed = rooms.len(), attempts, "room placement finished");

    if rooms.is_empty() {
        if let Some(room) = emergency_room(map, rng, config) {
            event!(Level::WARN, ?room, "no room could be placed; using emergency room");
            carve_room(map, &room);
            map.add_room(room);
            rooms.push(room);
        } else {
            event!(Level::WARN, width, height, "map too small for an emergency room");
        }
    } else if rooms.len() < config.min_rooms {
        event!(
            Level::WARN,
            placed = rooms.len(),
            wanted = config.min_rooms,
            "placement attempts exhausted below the minimum room count"
        );
    }

    rooms
}

fn emergency_room(map: &Map, rng: &mut ChaCha8Rng, config: &GeneratorConfig) -> Option<Room> {
    let width = map.width() as i32;
    let height = map.height() as i32;
    let room_width = (config.min_room_size + 2).min(width - 2);
    let room_height = (config.min_room_size + 2).min(height - 2);
    let x = (width / 2 - room_width / 2).max(1);
    let y = (height / 2 - room_height / 2).max(1);
    let lit = random_unit(rng) < config.lit_room_chance;

    let room = Room::new(x, y, room_width, room_height)
        .with_lit(lit)
        .with_type(RoomType::Entrance);
    let inside = room.right() < width && room.bottom() < height;
    (room.is_valid() && inside).then_some(room)
}
