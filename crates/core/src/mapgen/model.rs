//! Public data models for generation requests and results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Pos;
use crate::validator::{RepairReport, ValidationResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapKind {
    TestRoom,
    TestDungeon,
    CorridorTest,
    CombatArena,
    StressTest,
    #[default]
    Procedural,
}

impl MapKind {
    pub const ALL: [MapKind; 6] = [
        MapKind::TestRoom,
        MapKind::TestDungeon,
        MapKind::CorridorTest,
        MapKind::CombatArena,
        MapKind::StressTest,
        MapKind::Procedural,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            MapKind::TestRoom => "test_room",
            MapKind::TestDungeon => "test_dungeon",
            MapKind::CorridorTest => "corridor_test",
            MapKind::CombatArena => "combat_arena",
            MapKind::StressTest => "stress_test",
            MapKind::Procedural => "procedural",
        }
    }

    /// Kinds whose layout depends on the seed.
    pub const fn is_seeded(self) -> bool {
        matches!(self, MapKind::Procedural)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorridorStyle {
    Straight,
    #[default]
    LShaped,
    SShaped,
    Organic,
}

impl CorridorStyle {
    pub const ALL: [CorridorStyle; 4] = [
        CorridorStyle::Straight,
        CorridorStyle::LShaped,
        CorridorStyle::SShaped,
        CorridorStyle::Organic,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            CorridorStyle::Straight => "straight",
            CorridorStyle::LShaped => "l_shaped",
            CorridorStyle::SShaped => "s_shaped",
            CorridorStyle::Organic => "organic",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStrategy {
    Sequential,
    Nearest,
    #[default]
    Mst,
    Random,
}

impl ConnectionStrategy {
    pub const ALL: [ConnectionStrategy; 4] = [
        ConnectionStrategy::Sequential,
        ConnectionStrategy::Nearest,
        ConnectionStrategy::Mst,
        ConnectionStrategy::Random,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ConnectionStrategy::Sequential => "sequential",
            ConnectionStrategy::Nearest => "nearest",
            ConnectionStrategy::Mst => "mst",
            ConnectionStrategy::Random => "random",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {what} '{value}' (expected one of: {expected})")]
pub struct ParseNameError {
    what: &'static str,
    value: String,
    expected: String,
}

macro_rules! named_enum {
    ($ty:ty, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = ParseNameError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
                <$ty>::ALL.into_iter().find(|candidate| candidate.name() == normalized).ok_or_else(
                    || ParseNameError {
                        what: $what,
                        value: value.to_string(),
                        expected: <$ty>::ALL.map(|candidate| candidate.name()).join(", "),
                    },
                )
            }
        }
    };
}

named_enum!(MapKind, "map kind");
named_enum!(CorridorStyle, "corridor style");
named_enum!(ConnectionStrategy, "connection strategy");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorridorOptions {
    pub width: i32,
    pub style: CorridorStyle,
    pub place_doors: bool,
    pub strategy: ConnectionStrategy,
}

impl Default for CorridorOptions {
    fn default() -> Self {
        Self {
            width: 1,
            style: CorridorStyle::LShaped,
            place_doors: true,
            strategy: ConnectionStrategy::Mst,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationPhase {
    Clear,
    PlaceRooms,
    ConnectRooms,
    PlaceDoors,
    PlaceStairs,
    Validate,
    Done,
}

impl fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationPhase::Clear => "Clear",
            GenerationPhase::PlaceRooms => "PlaceRooms",
            GenerationPhase::ConnectRooms => "ConnectRooms",
            GenerationPhase::PlaceDoors => "PlaceDoors",
            GenerationPhase::PlaceStairs => "PlaceStairs",
            GenerationPhase::Validate => "Validate",
            GenerationPhase::Done => "Done",
        };
        f.write_str(name)
    }
}

/// What a generation call produced, alongside the grid it populated.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationOutcome {
    /// The seed actually used; a requested seed of 0 is replaced by a runtime seed.
    pub seed: u64,
    pub kind: MapKind,
    pub spawn: Pos,
    pub stairs_down: Option<Pos>,
    /// Previous level's down stairs, when the level was entered from above.
    pub up_stairs_near: Option<Pos>,
    pub stairs_up: Option<Pos>,
    pub rooms_placed: usize,
    pub corridors_carved: usize,
    pub doors_placed: usize,
    /// `None` when the validate step was skipped.
    pub repair: Option<RepairReport>,
    pub validation: Option<ValidationResult>,
}

impl GenerationOutcome {
    /// The validator accepted the level (after any repair it performed).
    pub fn is_playable(&self) -> bool {
        let repaired = self.repair.as_ref().is_none_or(|report| report.success);
        repaired && self.validation.as_ref().is_some_and(|result| result.valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for kind in MapKind::ALL {
            assert_eq!(kind.to_string().parse::<MapKind>(), Ok(kind));
        }
        for style in CorridorStyle::ALL {
            assert_eq!(style.to_string().parse::<CorridorStyle>(), Ok(style));
        }
        for strategy in ConnectionStrategy::ALL {
            assert_eq!(strategy.to_string().parse::<ConnectionStrategy>(), Ok(strategy));
        }
    }

    #[test]
    fn parsing_accepts_dashes_and_case() {
        assert_eq!("Test-Dungeon".parse::<MapKind>(), Ok(MapKind::TestDungeon));
        assert_eq!("MST".parse::<ConnectionStrategy>(), Ok(ConnectionStrategy::Mst));
    }

    #[test]
    fn unknown_names_list_the_alternatives() {
        let err = "spiral".parse::<CorridorStyle>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("spiral"));
        assert!(message.contains("l_shaped"));
    }

    #[test]
    fn default_corridor_options_match_the_procedural_preset() {
        let options = CorridorOptions::default();
        assert_eq!(options.width, 1);
        assert_eq!(options.style, CorridorStyle::LShaped);
        assert!(options.place_doors);
        assert_eq!(options.strategy, ConnectionStrategy::Mst);
    }
}
