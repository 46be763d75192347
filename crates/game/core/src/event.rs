//! Notifications raised by the battlefield.
//!
//! `FinishedMoving` and `FinishedAction` are the completion signals the turn
//! layer waits on; everything else is informational for presentation.

use crate::grid::{Faction, Position};
use crate::unit::{ActionHandle, UnitId};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleEvent {
    MoveStarted {
        unit: UnitId,
        from: Position,
        to: Position,
    },

    /// The unit settled on its destination.
    FinishedMoving { unit: UnitId, at: Position },

    AttackStarted {
        unit: UnitId,
        target: Position,
        handle: ActionHandle,
    },

    /// Damage landed on whoever stood on the target cell at resolution time.
    AttackResolved {
        attacker: UnitId,
        target: Option<UnitId>,
        damage: u32,
    },

    InteractStarted {
        unit: UnitId,
        target: Position,
        handle: ActionHandle,
    },

    Interacted { unit: UnitId, at: Position },

    /// The unit's attack or interaction has concluded.
    FinishedAction { unit: UnitId },

    UnitDefeated {
        unit: UnitId,
        faction: Faction,
        at: Position,
    },
}

impl BattleEvent {
    /// Unit the event is about.
    pub fn unit(&self) -> UnitId {
        match self {
            Self::MoveStarted { unit, .. }
            | Self::FinishedMoving { unit, .. }
            | Self::AttackStarted { unit, .. }
            | Self::InteractStarted { unit, .. }
            | Self::Interacted { unit, .. }
            | Self::FinishedAction { unit }
            | Self::UnitDefeated { unit, .. } => *unit,
            Self::AttackResolved { attacker, .. } => *attacker,
        }
    }

    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            Self::FinishedMoving { .. } | Self::FinishedAction { .. }
        )
    }
}
