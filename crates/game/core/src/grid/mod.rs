//! Node lattice and the search algorithms that run over it.
//!
//! - [`Grid`] owns one [`Node`] per integer coordinate in its bounds
//! - [`pathing`] implements the destination-rooted heuristic search
//! - [`reach`] implements the movement / attack flood fills
mod lattice;
mod node;
pub mod pathing;
mod reach;
mod types;

pub use lattice::Grid;
pub use node::Node;
pub use pathing::{PathError, PathQuery, PathSummary};
pub use types::{Direction, Faction, GridBounds, NodeId, NodeSet, Occupancy, Position, WorldPos};
