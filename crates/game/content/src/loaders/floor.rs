//! Floor layout loader.
//!
//! Floor files list coordinates as `(x, y)` tuples:
//!
//! ```ron
//! (
//!     top_left: (0, 5),
//!     bot_right: (7, 0),
//!     walls: [(3, 1), (3, 2)],
//!     interactables: [(7, 5)],
//!     units: [
//!         (id: 1, faction: Ally, at: (0, 0)),
//!         (id: 10, faction: Enemy, at: (6, 4), behavior: DefendTile),
//!     ],
//! )
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tactics_core::{BehaviorKind, Faction, FloorLayout, Position, UnitId, UnitSpawn, UnitStats};

use crate::loaders::{LoadResult, read_file};

/// Floor data structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FloorRon {
    top_left: (i32, i32),
    bot_right: (i32, i32),
    #[serde(default)]
    walls: Vec<(i32, i32)>,
    #[serde(default)]
    interactables: Vec<(i32, i32)>,
    #[serde(default)]
    units: Vec<UnitRon>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UnitRon {
    id: u32,
    faction: Faction,
    at: (i32, i32),
    #[serde(default)]
    stats: UnitStats,
    #[serde(default)]
    behavior: BehaviorKind,
}

/// Loader for [`FloorLayout`]s from RON files.
pub struct FloorLoader;

impl FloorLoader {
    pub fn load(path: &Path) -> LoadResult<FloorLayout> {
        let content = read_file(path)?;
        let layout = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid floor {}: {}", path.display(), e))?;

        tracing::debug!(
            path = %path.display(),
            walls = layout.walls.len(),
            units = layout.units.len(),
            "floor file loaded"
        );
        Ok(layout)
    }

    /// Parses a floor and checks it is structurally sound. Placement
    /// conflicts (a spawn on a wall, a spawn off the grid) are left to
    /// `Battlefield::from_layout`.
    pub fn parse(content: &str) -> LoadResult<FloorLayout> {
        let data: FloorRon = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse floor RON: {}", e))?;

        let mut seen = BTreeSet::new();
        for unit in &data.units {
            if !seen.insert(unit.id) {
                anyhow::bail!("unit id {} is listed more than once", unit.id);
            }
        }
        if !data.units.iter().any(|unit| unit.faction == Faction::Ally) {
            anyhow::bail!("floor has no ally units");
        }

        let to_position = |(x, y): (i32, i32)| Position::new(x, y);
        let layout = FloorLayout::new(to_position(data.top_left), to_position(data.bot_right))
            .with_walls(data.walls.into_iter().map(to_position))
            .with_interactables(data.interactables.into_iter().map(to_position));

        Ok(data.units.into_iter().fold(layout, |layout, unit| {
            layout.with_unit(
                UnitSpawn::new(UnitId(unit.id), unit.faction, to_position(unit.at))
                    .with_stats(unit.stats)
                    .with_behavior(unit.behavior),
            )
        }))
    }
}
