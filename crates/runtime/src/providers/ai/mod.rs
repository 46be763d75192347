//! Enemy AI strategies.
//!
//! Each enemy carries a [`BehaviorKind`](tactics_core::BehaviorKind) tag; the
//! [`StrategyRegistry`] maps the tag to an [`EnemyStrategy`]:
//!
//! - [`MeleeStrategy`]: strike anything already in reach, otherwise close in on
//!   the hostile with the cheapest reachable attack position
//! - [`RangedStrategy`]: like melee, but prefers attack positions at the edge
//!   of its range
//! - [`DefendTileStrategy`]: never moves, strikes whatever wanders into reach

mod defend;
mod melee;
mod ranged;
mod strategy;

pub use defend::DefendTileStrategy;
pub use melee::MeleeStrategy;
pub use ranged::RangedStrategy;
pub use strategy::{EnemyStrategy, StrategyRegistry};
