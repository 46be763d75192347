//! Event types for the turn and selection topics.
//!
//! Battle events are the core's own [`tactics_core::BattleEvent`] and need no
//! wrapper here.

use serde::{Deserialize, Serialize};
use tactics_core::{ActionHandle, BehaviorKind, FloorOutcome, PhaseChange, Position, UnitId};

/// Events related to turn management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEvent {
    /// A phase transition was committed.
    PhaseChanged(PhaseChange),

    /// The enemy sequencer snapshotted its roster.
    EnemyTurnStarted { enemies: usize },

    /// The sequencer handed control to one enemy.
    EnemyActing {
        unit: UnitId,
        behavior: BehaviorKind,
    },

    /// One faction has been wiped out.
    FloorDecided { outcome: FloorOutcome, round: u32 },
}

/// Results of feeding a selected cell to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionEvent {
    /// An ally was selected; its highlight overlays.
    Selected {
        unit: UnitId,
        move_tiles: Vec<Position>,
        attack_tiles: Vec<Position>,
    },

    Deselected,

    MoveOrdered {
        unit: UnitId,
        to: Position,
        /// Attack queued behind the move's completion signal.
        then_attack: Option<Position>,
    },

    AttackOrdered {
        unit: UnitId,
        target: Position,
        handle: ActionHandle,
    },

    InteractOrdered {
        unit: UnitId,
        target: Position,
        handle: ActionHandle,
    },

    /// Input arrived while the player could not act.
    Ignored { position: Position },
}
