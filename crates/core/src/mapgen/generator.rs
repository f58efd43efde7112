//! High-level map generation orchestration: rooms, corridors, doors, stairs, then validation.

use std::time::Instant;

use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};
use tracing::{Level, event, span};

use crate::config::GeneratorConfig;
use crate::map::Map;
use crate::types::{Pos, TileKind};
use crate::validator::{validate, validate_and_fix_report};

use super::connections::connections_for;
use super::corridors::carve_corridor;
use super::doors::place_doors_at_room_entrances;
use super::fixed::generate_fixed;
use super::model::{GenerationOutcome, GenerationPhase, MapKind};
use super::rooms::generate_random_rooms;
use super::seed::resolve_seed;
use super::stairs::{choose_stairs_location, place_stairs, place_up_stairs, spawn_point_for};

fn phase_finished(phase: GenerationPhase, started: Instant) {
    let elapsed_us = started.elapsed().as_micros() as u64;
    event!(Level::DEBUG, %phase, elapsed_us, "phase finished");
}

fn place_entry_stairs(map: &mut Map, near: Option<Pos>) -> Option<Pos> {
    let near = near?;
    let placed = place_up_stairs(map, near);
    if placed.is_none() {
        event!(Level::WARN, ?near, "no floor cell available for the up stairs");
    }
    placed
}

#[derive(Clone, Debug, Default)]
pub struct MapGenerator {
    config: GeneratorConfig,
}

impl MapGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Fills `map` with a level of the given kind, then validates it. Procedural levels are
    /// repaired when disconnected; fixed layouts are only checked. A `seed` of 0 picks a runtime
    /// seed, reported back in the outcome.
    pub fn generate(&self, map: &mut Map, kind: MapKind, seed: u64) -> GenerationOutcome {
        self.run(map, kind, seed, None, true)
    }

    /// Like [`MapGenerator::generate`], for a level entered from above: up stairs go on the Floor
    /// cell nearest `up_stairs_near` and the viewer spawns on them. The same arguments rebuild
    /// the same level.
    pub fn generate_with_entry(
        &self,
        map: &mut Map,
        kind: MapKind,
        seed: u64,
        up_stairs_near: Option<Pos>,
    ) -> GenerationOutcome {
        self.run(map, kind, seed, up_stairs_near, true)
    }

    /// Same pipeline without the validate step, so callers can inspect raw connectivity.
    pub fn generate_unvalidated(
        &self,
        map: &mut Map,
        kind: MapKind,
        seed: u64,
    ) -> GenerationOutcome {
        self.run(map, kind, seed, None, false)
    }

    fn run(
        &self,
        map: &mut Map,
        kind: MapKind,
        seed: u64,
        up_stairs_near: Option<Pos>,
        validate_level: bool,
    ) -> GenerationOutcome {
        let seed = resolve_seed(seed);
        let (width, height) = (map.width(), map.height());
        let span = span!(Level::DEBUG, "generate_map", %kind, seed, width, height);
        let _guard = span.enter();

        let mut outcome = if kind == MapKind::Procedural {
            self.generate_procedural(map, seed, up_stairs_near, validate_level)
        } else {
            self.generate_fixed_layout(map, kind, seed, up_stairs_near, validate_level)
        };
        outcome.spawn = outcome.stairs_up.unwrap_or_else(|| spawn_point_for(map, kind));

        event!(
            Level::DEBUG,
            phase = %GenerationPhase::Done,
            rooms = outcome.rooms_placed,
            corridors = outcome.corridors_carved,
            doors = outcome.doors_placed,
            spawn = ?outcome.spawn,
            stairs = ?outcome.stairs_down,
            up_stairs = ?outcome.stairs_up,
            "generation finished"
        );
        outcome
    }

    fn generate_fixed_layout(
        &self,
        map: &mut Map,
        kind: MapKind,
        seed: u64,
        up_stairs_near: Option<Pos>,
        validate_level: bool,
    ) -> GenerationOutcome {
        let started = Instant::now();
        generate_fixed(map, kind);
        phase_finished(GenerationPhase::PlaceRooms, started);

        let started = Instant::now();
        let stairs_up = place_entry_stairs(map, up_stairs_near);
        phase_finished(GenerationPhase::PlaceStairs, started);

        let validation = validate_level.then(|| {
            let started = Instant::now();
            let result = validate(map);
            phase_finished(GenerationPhase::Validate, started);
            result
        });

        GenerationOutcome {
            seed,
            kind,
            spawn: map.center(),
            stairs_down: map.find_first(TileKind::StairsDown),
            up_stairs_near,
            stairs_up,
            rooms_placed: map.rooms().len(),
            corridors_carved: 0,
            doors_placed: map.count(TileKind::DoorClosed) + map.count(TileKind::DoorOpen),
            repair: None,
            validation,
        }
    }

    fn generate_procedural(
        &self,
        map: &mut Map,
        seed: u64,
        up_stairs_near: Option<Pos>,
        validate_level: bool,
    ) -> GenerationOutcome {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let corridor = self.config.corridor;

        let started = Instant::now();
        map.reset();
        phase_finished(GenerationPhase::Clear, started);

        let started = Instant::now();
        let rooms = generate_random_rooms(map, &mut rng, &self.config);
        phase_finished(GenerationPhase::PlaceRooms, started);

        let started = Instant::now();
        let connections = connections_for(corridor.strategy, &rooms, &mut rng);
        for &(from, to) in &connections {
            carve_corridor(
                map,
                &mut rng,
                rooms[from].center(),
                rooms[to].center(),
                corridor.style,
                corridor.width,
            );
        }
        phase_finished(GenerationPhase::ConnectRooms, started);

        let started = Instant::now();
        let doors_placed =
            if corridor.place_doors { place_doors_at_room_entrances(map, &rooms) } else { 0 };
        phase_finished(GenerationPhase::PlaceDoors, started);

        let started = Instant::now();
        let stairs_down = choose_stairs_location(map, &rooms).filter(|&pos| place_stairs(map, pos));
        if stairs_down.is_none() {
            event!(Level::WARN, rooms = rooms.len(), "no floor cell available for the down stairs");
        }
        let stairs_up = place_entry_stairs(map, up_stairs_near);
        phase_finished(GenerationPhase::PlaceStairs, started);

        let (repair, validation) = if validate_level {
            let started = Instant::now();
            let repair = validate_and_fix_report(map, self.config.min_playable_tiles);
            let validation = validate(map);
            phase_finished(GenerationPhase::Validate, started);
            (Some(repair), Some(validation))
        } else {
            (None, None)
        };

        GenerationOutcome {
            seed,
            kind: MapKind::Procedural,
            spawn: map.center(),
            stairs_down,
            up_stairs_near,
            stairs_up,
            rooms_placed: rooms.len(),
            corridors_carved: connections.len(),
            doors_placed,
            repair,
            validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::model::{ConnectionStrategy, CorridorOptions, CorridorStyle};
    use crate::validator::{check_connectivity, is_reachable};

    fn generate_default(seed: u64) -> (Map, GenerationOutcome) {
        let mut map = Map::default();
        let outcome = MapGenerator::default().generate(&mut map, MapKind::Procedural, seed);
        (map, outcome)
    }

    #[test]
    fn same_seed_reproduces_the_same_level() {
        let (first, first_outcome) = generate_default(42);
        let (second, second_outcome) = generate_default(42);
        assert_eq!(first.fingerprint(), second.fingerprint());
        assert_eq!(first.rooms(), second.rooms());
        assert_eq!(first_outcome, second_outcome);

        let (other, _) = generate_default(43);
        assert_ne!(first.fingerprint(), other.fingerprint());
    }

    #[test]
    fn seed_zero_reports_the_seed_it_used() {
        let (map, outcome) = generate_default(0);
        assert_ne!(outcome.seed, 0);
        let (again, _) = generate_default(outcome.seed);
        assert_eq!(map.fingerprint(), again.fingerprint());
    }

    #[test]
    fn procedural_level_is_playable() {
        let (map, outcome) = generate_default(42);
        assert!(outcome.is_playable(), "{outcome:?}");
        assert_eq!(map.count(TileKind::StairsDown), 1);
        assert_eq!(outcome.stairs_down, map.find_first(TileKind::StairsDown));
        assert_eq!(outcome.rooms_placed, map.rooms().len());
        assert_eq!(outcome.corridors_carved, outcome.rooms_placed - 1);
        assert!(map.is_walkable(outcome.spawn));
        assert_eq!(Some(outcome.spawn), map.room(0).map(|room| room.center()));
        assert!(check_connectivity(&map));
    }

    #[test]
    fn unvalidated_generation_skips_repair() {
        let mut map = Map::default();
        let outcome =
            MapGenerator::default().generate_unvalidated(&mut map, MapKind::Procedural, 7);
        assert!(outcome.repair.is_none());
        assert!(outcome.validation.is_none());
        assert!(!outcome.is_playable());
    }

    #[test]
    fn every_corridor_option_yields_a_valid_level() {
        for strategy in ConnectionStrategy::ALL {
            for style in CorridorStyle::ALL {
                let config = GeneratorConfig {
                    corridor: CorridorOptions { width: 1, style, place_doors: true, strategy },
                    ..GeneratorConfig::default()
                };
                let mut map = Map::default();
                let outcome = MapGenerator::new(config).generate(&mut map, MapKind::Procedural, 99);
                assert!(outcome.is_playable(), "{strategy}/{style}: {:?}", outcome.validation);
            }
        }
    }

    #[test]
    fn fixed_layouts_are_checked_but_never_repaired() {
        for kind in MapKind::ALL.into_iter().filter(|kind| !kind.is_seeded()) {
            let mut map = Map::default();
            let outcome = MapGenerator::default().generate(&mut map, kind, 5);
            assert!(outcome.repair.is_none(), "{kind}");
            assert!(outcome.validation.is_some(), "{kind}");
            assert!(map.is_walkable(outcome.spawn), "{kind}");
            assert!(!map.rooms().is_empty(), "{kind}");
        }
    }

    #[test]
    fn doors_can_be_disabled() {
        let config = GeneratorConfig {
            corridor: CorridorOptions { place_doors: false, ..CorridorOptions::default() },
            ..GeneratorConfig::default()
        };
        let mut map = Map::default();
        let outcome = MapGenerator::new(config).generate(&mut map, MapKind::Procedural, 42);
        assert_eq!(outcome.doors_placed, 0);
        assert_eq!(map.count(TileKind::DoorClosed), 0);
    }

    #[test]
    fn entry_from_above_adds_reachable_up_stairs() {
        let entry = Pos::new(50, 20);
        let generator = MapGenerator::default();
        let mut map = Map::default();
        let outcome = generator.generate_with_entry(&mut map, MapKind::Procedural, 9, Some(entry));

        let up = outcome.stairs_up.expect("up stairs placed");
        assert_eq!(map.count(TileKind::StairsUp), 1);
        assert_eq!(map.tile(up), TileKind::StairsUp);
        assert_eq!(outcome.spawn, up);
        assert_eq!(outcome.up_stairs_near, Some(entry));
        assert!(outcome.is_playable(), "{:?}", outcome.validation);
        assert!(outcome.stairs_down.is_some_and(|down| is_reachable(&map, up, down)));

        let mut again = Map::default();
        generator.generate_with_entry(&mut again, MapKind::Procedural, 9, Some(entry));
        assert_eq!(map.fingerprint(), again.fingerprint());
    }

    #[test]
    fn fixed_layouts_accept_an_entry_too() {
        let mut map = Map::default();
        let outcome = MapGenerator::default().generate_with_entry(
            &mut map,
            MapKind::TestDungeon,
            1,
            Some(Pos::new(30, 16)),
        );
        assert!(outcome.stairs_up.is_some());
        assert_eq!(map.count(TileKind::StairsUp), 1);
        assert!(outcome.repair.is_none());
    }
}
