pub mod config;
pub mod fov;
pub mod map;
pub mod mapgen;
pub mod memory;
pub mod room;
pub mod snapshot;
pub mod types;
pub mod validator;

pub use config::{ConfigError, GeneratorConfig};
pub use fov::VisibilityGrid;
pub use map::{DEFAULT_HEIGHT, DEFAULT_WIDTH, Map};
pub use mapgen::{
    ConnectionStrategy, CorridorOptions, CorridorStyle, GenerationOutcome, MapGenerator, MapKind,
};
pub use memory::{MapMemory, VisibilityState};
pub use room::{Room, RoomType};
pub use snapshot::{LevelSnapshot, SnapshotError};
pub use types::*;
pub use validator::{ConnectivityResult, RepairReport, ValidationResult};
