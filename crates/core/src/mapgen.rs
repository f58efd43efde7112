//! Procedural map generation domain split into coherent submodules.

pub mod connections;
pub mod corridors;
pub mod doors;
pub mod fixed;
pub mod model;
pub mod rooms;
pub mod seed;
pub mod stairs;

mod generator;

pub use generator::MapGenerator;
pub use model::{
    ConnectionStrategy, CorridorOptions, CorridorStyle, GenerationOutcome, GenerationPhase, MapKind,
    ParseNameError,
};
pub use seed::{generate_runtime_seed, resolve_seed};

use crate::config::GeneratorConfig;
use crate::map::Map;

pub fn generate(
    map: &mut Map,
    kind: MapKind,
    seed: u64,
    config: &GeneratorConfig,
) -> GenerationOutcome {
    MapGenerator::new(config.clone()).generate(map, kind, seed)
}
