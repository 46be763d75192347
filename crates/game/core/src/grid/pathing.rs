//! Heuristic search over the lattice.
//!
//! The search is rooted at the destination and expands until it touches the
//! start, so once it succeeds every node on the route knows its next hop toward
//! the destination through `where_to_go`. The heuristic is the squared axis
//! distance, which is not admissible: routes are short, not guaranteed shortest.

use crate::error::{ErrorSeverity, GameError};

use super::{Faction, Grid, NodeId, Occupancy, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathError {
    #[error("start node is missing")]
    MissingStart,

    #[error("destination node is missing")]
    MissingDestination,

    #[error("destination {destination} is occupied ({occupant})")]
    DestinationOccupied {
        destination: Position,
        occupant: Occupancy,
    },

    #[error("no route from {start} to {destination}")]
    Unreachable {
        start: Position,
        destination: Position,
    },

    #[error("search exceeded {limit} iterations")]
    MaxIterationsExceeded { limit: u32 },
}

impl GameError for PathError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingStart | Self::MissingDestination => ErrorSeverity::Validation,
            Self::DestinationOccupied { .. } | Self::Unreachable { .. } => {
                ErrorSeverity::Recoverable
            }
            Self::MaxIterationsExceeded { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingStart => "PATH_MISSING_START",
            Self::MissingDestination => "PATH_MISSING_DESTINATION",
            Self::DestinationOccupied { .. } => "PATH_DESTINATION_OCCUPIED",
            Self::Unreachable { .. } => "PATH_UNREACHABLE",
            Self::MaxIterationsExceeded { .. } => "PATH_MAX_ITERATIONS",
        }
    }
}

/// Parameters of a single pathing call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathQuery {
    pub start: Option<NodeId>,
    pub end: Option<NodeId>,
    pub faction: Faction,
    pub care_about_occupancy: bool,
    pub max_iterations: u32,
}

impl PathQuery {
    pub fn new(start: Option<NodeId>, end: Option<NodeId>, faction: Faction) -> Self {
        Self {
            start,
            end,
            faction,
            care_about_occupancy: true,
            max_iterations: crate::TacticsConfig::DEFAULT_MAX_SEARCH_ITERATIONS,
        }
    }

    /// Lets the destination itself be occupied (e.g. routing onto a target).
    #[must_use]
    pub fn ignoring_destination_occupancy(mut self) -> Self {
        self.care_about_occupancy = false;
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, limit: u32) -> Self {
        self.max_iterations = limit;
        self
    }
}

/// Result of a successful search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathSummary {
    /// Number of hops from start to destination.
    pub hops: u32,
    /// F value of the start node; equal to `hops` since H(start) is zero.
    pub cost: i32,
}

impl Grid {
    /// Boolean contract: true iff the search frontier reached the start.
    pub fn pathing(&mut self, query: &PathQuery) -> bool {
        match self.try_pathing(query) {
            Ok(_) => true,
            Err(error @ PathError::MaxIterationsExceeded { .. }) => {
                tracing::warn!(
                    target: "tactics::grid",
                    error = %error,
                    code = error.error_code(),
                    "pathing aborted"
                );
                false
            }
            Err(error) => {
                tracing::trace!(target: "tactics::grid", error = %error, "pathing failed");
                false
            }
        }
    }

    /// Runs the search and reports why it failed.
    ///
    /// Scratch fields are cleared first, so a stale chain from an earlier call
    /// can never leak into this one.
    pub fn try_pathing(&mut self, query: &PathQuery) -> Result<PathSummary, PathError> {
        self.reset_pathing();

        let end = query.end.ok_or(PathError::MissingDestination)?;
        let end_node = self.node(end).ok_or(PathError::MissingDestination)?;
        let destination = end_node.position();
        if query.care_about_occupancy && !end_node.is_empty() {
            return Err(PathError::DestinationOccupied {
                destination,
                occupant: end_node.occupying(),
            });
        }

        let start = query.start.ok_or(PathError::MissingStart)?;
        let target = self.position_of(start).ok_or(PathError::MissingStart)?;

        let len = self.len();
        let mut open: Vec<NodeId> = vec![end];
        let mut in_open = vec![false; len];
        let mut closed = vec![false; len];
        in_open[end.index()] = true;

        let root = &mut self.nodes_mut()[end.index()];
        root.h = destination.distance_squared(target);
        root.f = root.h;

        let mut iterations = 0u32;
        while !open.is_empty() {
            iterations += 1;
            if iterations > query.max_iterations {
                return Err(PathError::MaxIterationsExceeded {
                    limit: query.max_iterations,
                });
            }

            // Linear scan; the earliest queued node wins ties.
            let slot = self.lowest_f(&open);
            let current = open.remove(slot);
            in_open[current.index()] = false;
            closed[current.index()] = true;

            if current == start {
                self.link_route(start, end);
                let hops = self.nodes_mut()[start.index()].g as u32;
                let cost = self.nodes_mut()[start.index()].f;
                return Ok(PathSummary { hops, cost });
            }

            let next_g = self.nodes_mut()[current.index()].g + 1;
            for neighbor in self.neighbors(current) {
                if closed[neighbor.index()] {
                    continue;
                }
                let node = &mut self.nodes_mut()[neighbor.index()];
                if neighbor != start && !node.occupying.is_passable_for(query.faction) {
                    continue;
                }

                if in_open[neighbor.index()] {
                    if next_g < node.g {
                        node.parent = Some(current);
                        node.g = next_g;
                        node.f = node.g.saturating_add(node.h);
                    }
                } else {
                    node.parent = Some(current);
                    node.g = next_g;
                    node.h = node.position().distance_squared(target);
                    node.f = node.g.saturating_add(node.h);
                    in_open[neighbor.index()] = true;
                    open.push(neighbor);
                }
            }
        }

        Err(PathError::Unreachable {
            start: target,
            destination,
        })
    }

    /// Hop count of the route currently encoded in `where_to_go`, starting at `from`.
    ///
    /// Returns None when the chain is broken or loops.
    pub fn route_from(&self, from: NodeId) -> Option<Vec<NodeId>> {
        let mut route = Vec::new();
        let mut cursor = from;
        for _ in 0..self.len() {
            let next = self.node(cursor)?.where_to_go()?;
            if next == cursor {
                return Some(route);
            }
            route.push(next);
            cursor = next;
        }
        None
    }

    fn lowest_f(&self, open: &[NodeId]) -> usize {
        open.iter()
            .enumerate()
            .min_by_key(|(_, id)| self.node(**id).map_or(i32::MAX, |node| node.f()))
            .map_or(0, |(slot, _)| slot)
    }

    /// Turns the parent chain (start → destination) into `where_to_go` hops and
    /// marks the destination with the self-pointing sentinel.
    fn link_route(&mut self, start: NodeId, end: NodeId) {
        let mut cursor = start;
        for _ in 0..self.len() {
            if cursor == end {
                break;
            }
            let Some(next) = self.nodes_mut()[cursor.index()].parent else {
                break;
            };
            self.nodes_mut()[cursor.index()].where_to_go = Some(next);
            cursor = next;
        }
        self.nodes_mut()[end.index()].where_to_go = Some(end);
    }
}
