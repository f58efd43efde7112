//! Level save/load. A snapshot stores the seed, the map kind and the explored cells; the tile
//! grid itself is regenerated on load and checked against the stored layout hash.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GeneratorConfig;
use crate::map::Map;
use crate::mapgen::{GenerationOutcome, MapGenerator, MapKind};
use crate::types::Pos;

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;
/// Largest grid a snapshot may ask to regenerate (4096×4096).
pub const MAX_SNAPSHOT_CELLS: usize = 4096 * 4096;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("snapshot JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot version: expected {expected}, found {found}")]
    UnsupportedVersion { expected: u32, found: u32 },

    #[error("snapshot dimensions {width}x{height} cannot hold a level")]
    DimensionMismatch { width: usize, height: usize },

    #[error("regenerated layout {actual} does not match saved layout {expected}")]
    LayoutMismatch { expected: String, actual: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LevelSnapshot {
    pub format_version: u32,
    pub seed: u64,
    pub map_kind: MapKind,
    pub width: usize,
    pub height: usize,
    /// Where the previous level's down stairs were, for levels entered from above.
    #[serde(default)]
    pub up_stairs_near: Option<Pos>,
    pub explored: Vec<Pos>,
    pub layout_sha256_hex: String,
}

impl LevelSnapshot {
    /// Records what is needed to rebuild `map`. `outcome` must come from the call that built it.
    pub fn capture(map: &Map, outcome: &GenerationOutcome) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            seed: outcome.seed,
            map_kind: outcome.kind,
            width: map.width(),
            height: map.height(),
            up_stairs_near: outcome.up_stairs_near,
            explored: map.explored_points(),
            layout_sha256_hex: map.layout_sha256_hex(),
        }
    }

    /// Regenerates the level with `config` and replays the explored cells onto it.
    pub fn restore(
        &self,
        config: &GeneratorConfig,
    ) -> Result<(Map, GenerationOutcome), SnapshotError> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                expected: SNAPSHOT_FORMAT_VERSION,
                found: self.format_version,
            });
        }
        if !usable_dimensions(self.width, self.height) {
            return Err(SnapshotError::DimensionMismatch { width: self.width, height: self.height });
        }

        let mut map = Map::new(self.width, self.height);
        let outcome = MapGenerator::new(config.clone()).generate_with_entry(
            &mut map,
            self.map_kind,
            self.seed,
            self.up_stairs_near,
        );

        let actual = map.layout_sha256_hex();
        if actual != self.layout_sha256_hex {
            return Err(SnapshotError::LayoutMismatch {
                expected: self.layout_sha256_hex.clone(),
                actual,
            });
        }

        for &pos in &self.explored {
            map.set_explored(pos, true);
        }
        Ok((map, outcome))
    }

    pub fn write_atomic(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self)?;

        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;

        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn usable_dimensions(width: usize, height: usize) -> bool {
    let side_fits = |side: usize| side > 0 && i32::try_from(side).is_ok();
    side_fits(width)
        && side_fits(height)
        && width.checked_mul(height).is_some_and(|cells| cells <= MAX_SNAPSHOT_CELLS)
}
