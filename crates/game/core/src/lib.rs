//! Deterministic tactical rules shared by every host.
//!
//! `tactics-core` owns the node lattice, the per-floor [`Battlefield`] (grid
//! controller plus unit movement and action), and the [`TurnController`]. It
//! performs no I/O; hosts drive it with [`Battlefield::advance`] ticks and
//! consume the [`BattleEvent`]s it raises.
pub mod battlefield;
pub mod config;
pub mod error;
pub mod event;
pub mod floor;
pub mod grid;
pub mod turn;
pub mod unit;

pub use battlefield::{ActionError, Battlefield, MoveError};
pub use config::TacticsConfig;
pub use error::{ErrorContext, ErrorSeverity, GameError};
pub use event::BattleEvent;
pub use floor::{FloorError, FloorLayout, UnitSpawn};
pub use grid::{
    Direction, Faction, Grid, GridBounds, Node, NodeId, NodeSet, Occupancy, PathError, PathQuery,
    PathSummary, Position, WorldPos,
};
pub use turn::{
    FloorOutcome, PendingResolutions, PhaseChange, ResolutionGuard, TurnController, TurnPhase,
};
pub use unit::{
    ActionHandle, BehaviorKind, Motion, PendingAction, TurnFlags, Unit, UnitId, UnitRoster,
    UnitStats,
};
