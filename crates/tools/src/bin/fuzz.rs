use anyhow::{Result, ensure};
use clap::Parser;
use delve_core::fov::{self, VisibilityGrid};
use delve_core::mapgen::{ConnectionStrategy, CorridorStyle, MapGenerator, MapKind};
use delve_core::validator::check_connectivity;
use delve_core::{CorridorOptions, GeneratorConfig, Map, Pos, TileKind};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 200)]
    runs: u32,
    #[arg(long, default_value_t = 198)]
    width: usize,
    #[arg(long, default_value_t = 66)]
    height: usize,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

#[derive(Default)]
struct Stats {
    runs: u32,
    connected_before_repair: u32,
    repaired: u32,
    unplayable: u32,
    rooms: usize,
    bridges: usize,
}

fn check_level(
    args: &Args,
    level_seed: u64,
    config: &GeneratorConfig,
    stats: &mut Stats,
) -> Result<()> {
    let generator = MapGenerator::new(config.clone());

    let mut raw = Map::new(args.width, args.height);
    generator.generate_unvalidated(&mut raw, MapKind::Procedural, level_seed);
    if check_connectivity(&raw) {
        stats.connected_before_repair += 1;
    }

    let mut map = Map::new(args.width, args.height);
    let outcome = generator.generate(&mut map, MapKind::Procedural, level_seed);
    let mut again = Map::new(args.width, args.height);
    generator.generate(&mut again, MapKind::Procedural, level_seed);
    ensure!(map == again, "Invariant failed: seed {level_seed} is not deterministic");

    let rooms = map.rooms();
    for (idx, room) in rooms.iter().enumerate() {
        ensure!(room.is_valid(), "Invariant failed: invalid room {room:?} (seed {level_seed})");
        let inside = map.in_bounds(Pos::new(room.left(), room.top()))
            && map.in_bounds(Pos::new(room.right(), room.bottom()));
        ensure!(inside, "Invariant failed: room {room:?} leaves the map (seed {level_seed})");
        for other in &rooms[idx + 1..] {
            ensure!(
                !room.overlaps(other, config.room_padding),
                "Invariant failed: {room:?} overlaps {other:?} (seed {level_seed})"
            );
        }
    }

    let mut grid = VisibilityGrid::default();
    fov::calculate(&map, outcome.spawn, config.fov_radius, &mut grid);
    ensure!(
        grid.is_visible(outcome.spawn),
        "Invariant failed: spawn not visible (seed {level_seed})"
    );

    if let Some(report) = outcome.repair {
        if report.bridges_carved > 0 {
            stats.repaired += 1;
        }
        stats.bridges += report.bridges_carved;
    }
    if outcome.is_playable() {
        ensure!(
            map.count(TileKind::StairsDown) == 1,
            "Invariant failed: playable level without exactly one down stairs (seed {level_seed})"
        );
    } else {
        stats.unplayable += 1;
        let errors = outcome.validation.map(|result| result.errors).unwrap_or_default();
        println!("seed {level_seed}: unplayable, {errors:?}");
    }

    stats.runs += 1;
    stats.rooms += rooms.len();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!(
        "Sweeping {} levels from base seed {} at {}x{}...",
        args.runs, args.seed, args.width, args.height
    );
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut stats = Stats::default();

    for _ in 0..args.runs {
        let level_seed = rng.next_u64().max(1);
        let config = GeneratorConfig {
            corridor: CorridorOptions {
                width: choose(&mut rng, &[1, 1, 2]),
                style: choose(&mut rng, &CorridorStyle::ALL),
                place_doors: choose(&mut rng, &[true, false]),
                strategy: choose(&mut rng, &ConnectionStrategy::ALL),
            },
            ..GeneratorConfig::default()
        };
        check_level(&args, level_seed, &config, &mut stats)?;
    }

    let runs = stats.runs.max(1);
    println!("Levels: {}", stats.runs);
    println!("Average rooms: {:.1}", stats.rooms as f64 / f64::from(runs));
    println!("Connected before repair: {}/{}", stats.connected_before_repair, stats.runs);
    println!("Repaired: {} ({} bridges)", stats.repaired, stats.bridges);
    println!("Unplayable: {}", stats.unplayable);
    println!("Fuzzing completed successfully.");
    Ok(())
}
