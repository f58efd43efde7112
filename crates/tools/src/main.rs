use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use delve_core::fov::{self, VisibilityGrid};
use delve_core::mapgen::{
    ConnectionStrategy, CorridorStyle, GenerationOutcome, MapGenerator, MapKind,
};
use delve_core::validator::{check_advanced_connectivity, validate};
use delve_core::{DEFAULT_HEIGHT, DEFAULT_WIDTH, GeneratorConfig, LevelSnapshot, Map, Pos};
use tracing::Level;

/// Generate, inspect and persist dungeon levels
#[derive(Parser)]
#[command(author, version, long_about = None)]
struct Cli {
    /// Log generation phases (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a level and print it
    Generate(LevelArgs),
    /// Generate a level and print its validation report as JSON
    Inspect(LevelArgs),
    /// Generate a level, explore around the spawn and save a snapshot
    Save {
        #[command(flatten)]
        level: LevelArgs,
        /// Snapshot file to write
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Regenerate a level from a snapshot and print it
    Load {
        /// Snapshot file to read
        #[arg(short, long)]
        path: PathBuf,
        /// TOML generator config used when the snapshot was saved
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the field of view from a point
    Fov {
        #[command(flatten)]
        level: LevelArgs,
        #[arg(long)]
        x: Option<i32>,
        #[arg(long)]
        y: Option<i32>,
        /// Defaults to the configured fov_radius
        #[arg(short, long)]
        radius: Option<i32>,
    },
}

#[derive(Args)]
struct LevelArgs {
    /// Seed; 0 picks one and reports it
    #[arg(short, long, default_value_t = 0)]
    seed: u64,
    #[arg(short, long, default_value_t = MapKind::Procedural)]
    kind: MapKind,
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,
    #[arg(long)]
    strategy: Option<ConnectionStrategy>,
    #[arg(long)]
    style: Option<CorridorStyle>,
    #[arg(long)]
    corridor_width: Option<i32>,
    #[arg(long)]
    no_doors: bool,
    /// Previous level's down stairs; places up stairs next to it
    #[arg(long, requires = "entry_y")]
    entry_x: Option<i32>,
    #[arg(long, requires = "entry_x")]
    entry_y: Option<i32>,
    /// TOML generator config; flags above override it
    #[arg(long)]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<GeneratorConfig> {
    match path {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(GeneratorConfig::default()),
    }
}

impl LevelArgs {
    fn config(&self) -> Result<GeneratorConfig> {
        let mut config = load_config(self.config.as_ref())?;
        if let Some(strategy) = self.strategy {
            config.corridor.strategy = strategy;
        }
        if let Some(style) = self.style {
            config.corridor.style = style;
        }
        if let Some(width) = self.corridor_width {
            config.corridor.width = width;
        }
        if self.no_doors {
            config.corridor.place_doors = false;
        }
        config.validate().context("Invalid generator options")?;
        Ok(config)
    }

    fn generate(&self) -> Result<(Map, GenerationOutcome, GeneratorConfig)> {
        if self.width < 3 || self.height < 3 {
            bail!("map must be at least 3x3, got {}x{}", self.width, self.height);
        }
        let config = self.config()?;
        let mut map = Map::new(self.width, self.height);
        let entry = self.entry_x.zip(self.entry_y).map(|(x, y)| Pos::new(x, y));
        let outcome = MapGenerator::new(config.clone()).generate_with_entry(
            &mut map,
            self.kind,
            self.seed,
            entry,
        );
        Ok((map, outcome, config))
    }
}

fn print_summary(map: &Map, outcome: &GenerationOutcome) {
    println!("Kind: {}", outcome.kind);
    println!("Seed: {}", outcome.seed);
    println!("Size: {}x{}", map.width(), map.height());
    println!(
        "Rooms: {}  Corridors: {}  Doors: {}",
        outcome.rooms_placed, outcome.corridors_carved, outcome.doors_placed
    );
    println!("Spawn: ({}, {})", outcome.spawn.x, outcome.spawn.y);
    match outcome.stairs_down {
        Some(stairs) => println!("Stairs: ({}, {})", stairs.x, stairs.y),
        None => println!("Stairs: none"),
    }
    if let Some(up) = outcome.stairs_up {
        println!("Up stairs: ({}, {})", up.x, up.y);
    }
    println!("Playable: {}", outcome.is_playable());
    println!("Layout: {}", map.layout_sha256_hex());
}

fn render_fov(map: &Map, grid: &VisibilityGrid, origin: Pos) -> String {
    let mut text = String::new();
    for y in 0..map.height() as i32 {
        for x in 0..map.width() as i32 {
            let pos = Pos { y, x };
            let glyph = if pos == origin {
                '@'
            } else if grid.is_visible(pos) {
                map.glyph(pos)
            } else {
                ' '
            };
            text.push(glyph);
        }
        text.push('\n');
    }
    text
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).with_writer(io::stderr).init();

    match cli.command {
        Command::Generate(args) => {
            let (map, outcome, _) = args.generate()?;
            print!("{}", map.render_ascii());
            print_summary(&map, &outcome);
        }
        Command::Inspect(args) => {
            let (map, outcome, _) = args.generate()?;
            let connectivity = check_advanced_connectivity(&map);
            let report = serde_json::json!({
                "seed": outcome.seed,
                "kind": outcome.kind,
                "repair": outcome.repair,
                "validation": validate(&map),
                "components": connectivity.num_components,
                "connectivity_ratio": connectivity.connectivity_ratio(),
                "fingerprint": format!("{:016x}", map.fingerprint()),
            });
            let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
            println!("{json}");
        }
        Command::Save { level, out } => {
            let (mut map, outcome, config) = level.generate()?;
            map.update_visibility(outcome.spawn, config.fov_radius);
            let snapshot = LevelSnapshot::capture(&map, &outcome);
            snapshot
                .write_atomic(&out)
                .with_context(|| format!("Failed to write snapshot: {}", out.display()))?;
            println!(
                "Saved seed {} ({} explored cells) to {}",
                snapshot.seed,
                snapshot.explored.len(),
                out.display()
            );
        }
        Command::Load { path, config } => {
            let config = load_config(config.as_ref())?;
            let snapshot = LevelSnapshot::load(&path)
                .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
            let (map, outcome) = snapshot
                .restore(&config)
                .with_context(|| format!("Failed to restore level from {}", path.display()))?;
            print!("{}", map.render_ascii());
            print_summary(&map, &outcome);
            println!("Explored: {}", map.explored_points().len());
        }
        Command::Fov { level, x, y, radius } => {
            let (map, outcome, config) = level.generate()?;
            let origin = Pos { y: y.unwrap_or(outcome.spawn.y), x: x.unwrap_or(outcome.spawn.x) };
            if !map.in_bounds(origin) {
                bail!(
                    "origin ({}, {}) is outside the {}x{} map",
                    origin.x,
                    origin.y,
                    map.width(),
                    map.height()
                );
            }
            let radius = radius.unwrap_or(config.fov_radius);
            let mut grid = VisibilityGrid::default();
            fov::calculate(&map, origin, radius, &mut grid);
            print!("{}", render_fov(&map, &grid, origin));
            println!(
                "Visible: {} cells from ({}, {}) at radius {radius}",
                grid.visible_count(),
                origin.x,
                origin.y
            );
        }
    }

    Ok(())
}
