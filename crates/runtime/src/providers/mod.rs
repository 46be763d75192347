//! Decision makers for the two sides of the board: enemy strategies and the
//! player's selection orchestrator.

pub mod ai;
pub mod selection;

pub use ai::{DefendTileStrategy, EnemyStrategy, MeleeStrategy, RangedStrategy, StrategyRegistry};
pub use selection::SelectionOrchestrator;
