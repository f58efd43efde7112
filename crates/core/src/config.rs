//! Generator tunables, loaded from TOML or built from defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mapgen::model::CorridorOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{field} must be at least {min}, got {value}")]
    TooSmall { field: &'static str, min: i64, value: i64 },

    #[error("{min_field} ({min}) is greater than {max_field} ({max})")]
    InvertedRange { min_field: &'static str, max_field: &'static str, min: i64, max: i64 },

    #[error("lit_room_chance must be within [0, 1], got {0}")]
    ChanceOutOfRange(f64),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub min_room_size: i32,
    pub max_room_size: i32,
    pub min_rooms: usize,
    pub max_rooms: usize,
    pub max_placement_attempts: u32,
    /// Minimum gap between rooms, in cells.
    pub room_padding: i32,
    pub lit_room_chance: f64,
    pub min_playable_tiles: usize,
    pub fov_radius: i32,
    pub corridor: CorridorOptions,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_room_size: 4,
            max_room_size: 20,
            min_rooms: 15,
            max_rooms: 40,
            max_placement_attempts: 2000,
            room_padding: 1,
            lit_room_chance: 0.3,
            min_playable_tiles: 50,
            fov_radius: 10,
            corridor: CorridorOptions::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parses and validates a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        at_least("min_room_size", i64::from(self.min_room_size), 3)?;
        ordered(
            "min_room_size",
            "max_room_size",
            self.min_room_size.into(),
            self.max_room_size.into(),
        )?;
        at_least("max_rooms", self.max_rooms as i64, 1)?;
        ordered("min_rooms", "max_rooms", self.min_rooms as i64, self.max_rooms as i64)?;
        at_least("max_placement_attempts", i64::from(self.max_placement_attempts), 1)?;
        at_least("room_padding", i64::from(self.room_padding), 0)?;
        at_least("corridor.width", i64::from(self.corridor.width), 1)?;
        at_least("fov_radius", i64::from(self.fov_radius), 0)?;
        if !(0.0..=1.0).contains(&self.lit_room_chance) {
            return Err(ConfigError::ChanceOutOfRange(self.lit_room_chance));
        }
        Ok(())
    }
}

fn at_least(field: &'static str, value: i64, min: i64) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::TooSmall { field, min, value });
    }
    Ok(())
}

fn ordered(
    min_field: &'static str,
    max_field: &'static str,
    min: i64,
    max: i64,
) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvertedRange { min_field, max_field, min, max });
    }
    Ok(())
}
