//! Runtime orchestration for the tactical core.
//!
//! This crate wires the deterministic rules of `tactics-core` into a playable
//! floor. Hosts embed a [`Session`] to drive ticks, feed player selections,
//! acknowledge finished presentations, and subscribe to events.
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the orchestrator and builder
//! - [`sequencer`] runs the enemy turn one unit at a time
//! - [`providers`] holds the enemy strategies and the player's selection orchestrator
//! - [`events`] provides topic-based event bus for flexible event routing
pub mod error;
pub mod events;
pub mod providers;
pub mod sequencer;
pub mod session;

pub use error::{Result, RuntimeError};
pub use events::{Event, EventBus, SelectionEvent, Topic, TurnEvent};
pub use providers::{
    DefendTileStrategy, EnemyStrategy, MeleeStrategy, RangedStrategy, SelectionOrchestrator,
    StrategyRegistry,
};
pub use sequencer::{EnemyTurnSequencer, SequencerState};
pub use session::{Session, SessionBuilder, SessionConfig};
