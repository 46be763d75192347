//! Per-unit movement/action state.
//!
//! A [`Unit`] is plain data; every mutation that touches the lattice goes
//! through [`crate::Battlefield`] so occupancy and tile caches stay in sync.
mod roster;

pub use roster::UnitRoster;

use std::collections::VecDeque;
use std::fmt;

use bitflags::bitflags;

use crate::grid::{Faction, NodeId, NodeSet, Position, WorldPos};

/// Unique identifier for a unit on the current floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stat block handed over by the leveling layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UnitStats {
    pub max_health: u32,
    pub attack_power: u32,
    pub move_range: u32,
    pub attack_range: u32,
}

impl UnitStats {
    pub const fn new(max_health: u32, attack_power: u32, move_range: u32, attack_range: u32) -> Self {
        Self {
            max_health,
            attack_power,
            move_range,
            attack_range,
        }
    }
}

impl Default for UnitStats {
    fn default() -> Self {
        Self::new(10, 3, 3, 1)
    }
}

/// Enemy decision policy tag. The policies themselves live with the host.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BehaviorKind {
    /// Close in on the cheapest reachable hostile and strike.
    #[default]
    Melee,
    /// Keep to the edge of attack range.
    Ranged,
    /// Hold position; strike whatever wanders into range.
    DefendTile,
}

bitflags! {
    /// Turn-local action flags, cleared by `reset_turn`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TurnFlags: u8 {
        const MOVED    = 1 << 0;
        const ATTACKED = 1 << 1;
    }
}

/// Ticket for an in-flight attack or interaction.
///
/// Returned by the `start_*` calls; the host hands it back through
/// `complete_action` once its presentation has finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionHandle {
    pub unit: UnitId,
    pub serial: u64,
}

impl fmt::Display for ActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.unit, self.serial)
    }
}

/// The single pending-continuation slot of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingAction {
    Attack { handle: ActionHandle, target: Position },
    Interact { handle: ActionHandle, target: Position },
}

impl PendingAction {
    pub fn handle(&self) -> ActionHandle {
        match self {
            Self::Attack { handle, .. } | Self::Interact { handle, .. } => *handle,
        }
    }
}

/// Physical movement phase.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Motion {
    #[default]
    Idle,
    Moving {
        /// Node the unit is leaving on the current hop.
        from: NodeId,
        /// Remaining hops; the front is the current hop target.
        route: VecDeque<NodeId>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    id: UnitId,
    faction: Faction,
    behavior: BehaviorKind,
    stats: UnitStats,
    pub(crate) health: u32,
    pub(crate) position: WorldPos,
    pub(crate) move_range: u32,
    pub(crate) attack_range: u32,
    pub(crate) move_tiles: NodeSet,
    pub(crate) attack_tiles: NodeSet,
    pub(crate) flags: TurnFlags,
    pub(crate) motion: Motion,
    pub(crate) pending: Option<PendingAction>,
}

impl Unit {
    pub fn new(id: UnitId, faction: Faction, position: Position, stats: UnitStats) -> Self {
        Self {
            id,
            faction,
            behavior: BehaviorKind::default(),
            stats,
            health: stats.max_health,
            position: position.to_world(),
            move_range: stats.move_range,
            attack_range: stats.attack_range,
            move_tiles: NodeSet::new(),
            attack_tiles: NodeSet::new(),
            flags: TurnFlags::empty(),
            motion: Motion::Idle,
            pending: None,
        }
    }

    #[must_use]
    pub fn with_behavior(mut self, behavior: BehaviorKind) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }

    pub fn behavior(&self) -> BehaviorKind {
        self.behavior
    }

    pub fn stats(&self) -> &UnitStats {
        &self.stats
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn world_position(&self) -> WorldPos {
        self.position
    }

    /// Cell the unit is physically over right now.
    pub fn grid_position(&self) -> Position {
        self.position.round()
    }

    /// Current reach; zero for the rest of the turn once the unit has moved.
    pub fn move_range(&self) -> u32 {
        self.move_range
    }

    pub fn attack_range(&self) -> u32 {
        self.attack_range
    }

    /// Cached landing set as of the last `calc_move_tiles`.
    pub fn move_tiles(&self) -> &NodeSet {
        &self.move_tiles
    }

    /// Cached attack set as of the last `calc_attack_tiles`.
    pub fn attack_tiles(&self) -> &NodeSet {
        &self.attack_tiles
    }

    pub fn flags(&self) -> TurnFlags {
        self.flags
    }

    pub fn has_moved(&self) -> bool {
        self.flags.contains(TurnFlags::MOVED)
    }

    pub fn has_attacked(&self) -> bool {
        self.flags.contains(TurnFlags::ATTACKED)
    }

    /// Both halves of the turn are spent.
    pub fn is_done(&self) -> bool {
        self.flags.contains(TurnFlags::MOVED | TurnFlags::ATTACKED)
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.motion, Motion::Moving { .. })
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    /// Mid-move or waiting on an action to resolve.
    pub fn is_busy(&self) -> bool {
        self.is_moving() || self.pending.is_some()
    }

    pub(crate) fn set_stats(&mut self, stats: UnitStats) {
        self.stats = stats;
    }
}
