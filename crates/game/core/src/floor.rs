//! Floor hand-over from the layout generator.
//!
//! A [`FloorLayout`] is consumed once at floor load: bounds, static blockers and
//! the starting roster. Generation itself happens elsewhere.

use crate::error::{ErrorSeverity, GameError};
use crate::grid::{Faction, Occupancy, Position};
use crate::unit::{BehaviorKind, UnitId, UnitStats};

/// Blueprint of a unit that exists when the floor starts.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitSpawn {
    pub id: UnitId,
    pub faction: Faction,
    pub position: Position,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stats: UnitStats,
    #[cfg_attr(feature = "serde", serde(default))]
    pub behavior: BehaviorKind,
}

impl UnitSpawn {
    pub fn new(id: UnitId, faction: Faction, position: Position) -> Self {
        Self {
            id,
            faction,
            position,
            stats: UnitStats::default(),
            behavior: BehaviorKind::default(),
        }
    }

    #[must_use]
    pub fn with_stats(mut self, stats: UnitStats) -> Self {
        self.stats = stats;
        self
    }

    #[must_use]
    pub fn with_behavior(mut self, behavior: BehaviorKind) -> Self {
        self.behavior = behavior;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloorLayout {
    pub top_left: Position,
    pub bot_right: Position,
    #[cfg_attr(feature = "serde", serde(default))]
    pub walls: Vec<Position>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub interactables: Vec<Position>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub units: Vec<UnitSpawn>,
}

impl FloorLayout {
    pub fn new(top_left: Position, bot_right: Position) -> Self {
        Self {
            top_left,
            bot_right,
            walls: Vec::new(),
            interactables: Vec::new(),
            units: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_walls(mut self, walls: impl IntoIterator<Item = Position>) -> Self {
        self.walls.extend(walls);
        self
    }

    #[must_use]
    pub fn with_interactables(mut self, cells: impl IntoIterator<Item = Position>) -> Self {
        self.interactables.extend(cells);
        self
    }

    #[must_use]
    pub fn with_unit(mut self, spawn: UnitSpawn) -> Self {
        self.units.push(spawn);
        self
    }
}

/// Errors raised while turning a layout into a playable floor.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FloorError {
    #[error("floor of {cells} cells exceeds the limit of {max}")]
    TooLarge { cells: usize, max: usize },

    #[error("position {position} lies outside the floor")]
    OutOfBounds { position: Position },

    #[error("position {position} is already taken ({occupant})")]
    CellTaken {
        position: Position,
        occupant: Occupancy,
    },

    #[error("unit {id} is spawned twice")]
    DuplicateUnit { id: UnitId },
}

impl GameError for FloorError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::TooLarge { .. } => "FLOOR_TOO_LARGE",
            Self::OutOfBounds { .. } => "FLOOR_OUT_OF_BOUNDS",
            Self::CellTaken { .. } => "FLOOR_CELL_TAKEN",
            Self::DuplicateUnit { .. } => "FLOOR_DUPLICATE_UNIT",
        }
    }
}
