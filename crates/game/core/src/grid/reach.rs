//! Breadth-first reachability queries.
//!
//! Distances here are hop counts, not path costs. Radii are clamped to the
//! lattice perimeter since no hop count beyond it can discover a new node.

use std::collections::VecDeque;

use super::{Faction, Grid, NodeId, NodeSet};

impl Grid {
    /// Cells a unit of `faction` standing on `start` could end a move on.
    ///
    /// Empty cells are landing spots and frontier. Cells held by the same
    /// faction are frontier only. Walls, interactables and the other faction
    /// stop expansion. `start` itself is always included.
    pub fn reachable_for_movement(&self, start: NodeId, radius: u32, faction: Faction) -> NodeSet {
        let mut landing = NodeSet::new();
        if self.node(start).is_none() {
            return landing;
        }
        landing.insert(start);

        let radius = radius.min(self.hop_ceiling());
        let mut visited = vec![false; self.len()];
        visited[start.index()] = true;
        let mut frontier = vec![start];

        for _ in 0..radius {
            let mut next = Vec::new();
            for &current in &frontier {
                for neighbor in self.neighbors(current) {
                    if visited[neighbor.index()] {
                        continue;
                    }
                    let Some(node) = self.node(neighbor) else {
                        continue;
                    };
                    let occupancy = node.occupying();
                    if occupancy.is_empty() {
                        landing.insert(neighbor);
                    } else if occupancy.faction() != Some(faction) {
                        continue;
                    }
                    visited[neighbor.index()] = true;
                    next.push(neighbor);
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        landing
    }

    /// Every node within `radius` hops of any node in `move_set`, regardless of
    /// what occupies it. Attacks are not blocked by walls or units.
    pub fn reachable_for_attack(&self, move_set: &NodeSet, radius: u32) -> NodeSet {
        let mut reach = NodeSet::new();
        for &origin in move_set {
            reach.extend(self.nodes_within_distance(origin, radius));
        }
        reach
    }

    /// Every node between 1 and `distance` hops from `start`, ignoring occupancy.
    pub fn nodes_within_distance(&self, start: NodeId, distance: u32) -> NodeSet {
        let mut found = NodeSet::new();
        if self.node(start).is_none() {
            return found;
        }

        let distance = distance.min(self.hop_ceiling());
        let mut visited = vec![false; self.len()];
        visited[start.index()] = true;
        let mut queue = VecDeque::from([(start, 0u32)]);

        while let Some((current, hops)) = queue.pop_front() {
            if hops == distance {
                continue;
            }
            for neighbor in self.neighbors(current) {
                if visited[neighbor.index()] {
                    continue;
                }
                visited[neighbor.index()] = true;
                found.insert(neighbor);
                queue.push_back((neighbor, hops + 1));
            }
        }

        found
    }

    fn hop_ceiling(&self) -> u32 {
        let bounds = self.bounds();
        bounds.width().saturating_add(bounds.height())
    }
}

#[cfg(test)]
mod tests {
    use crate::grid::{GridBounds, Occupancy, Position};

    use super::*;

    fn open_grid(width: i32, height: i32) -> Grid {
        Grid::new(GridBounds::from_corners(
            Position::new(0, height - 1),
            Position::new(width - 1, 0),
        ))
    }

    fn positions(grid: &Grid, set: &NodeSet) -> Vec<Position> {
        set.iter().map(|id| grid.position_of(*id).unwrap()).collect()
    }

    #[test]
    fn radius_zero_is_just_the_start() {
        let grid = open_grid(5, 5);
        let start = grid.node_id(Position::new(2, 2)).unwrap();
        let reach = grid.reachable_for_movement(start, 0, Faction::Ally);
        assert_eq!(reach, NodeSet::from([start]));
    }

    #[test]
    fn open_grid_reach_is_a_diamond() {
        let mut grid = open_grid(5, 5);
        let centre = Position::new(2, 2);
        grid.set_occupancy(centre, Occupancy::Ally);
        let start = grid.node_id(centre).unwrap();

        let reach = grid.reachable_for_movement(start, 2, Faction::Ally);

        assert_eq!(reach.len(), 13);
        for position in positions(&grid, &reach) {
            assert!(position.manhattan(centre) <= 2, "{position} outside diamond");
        }
    }

    #[test]
    fn reach_never_shrinks_with_radius() {
        let mut grid = open_grid(7, 7);
        grid.set_occupancy(Position::new(3, 4), Occupancy::Wall);
        grid.set_occupancy(Position::new(2, 3), Occupancy::Enemy);
        grid.set_occupancy(Position::new(4, 3), Occupancy::Ally);
        let start = grid.node_id(Position::new(3, 3)).unwrap();

        let mut previous = grid.reachable_for_movement(start, 0, Faction::Ally);
        for radius in 1..6 {
            let current = grid.reachable_for_movement(start, radius, Faction::Ally);
            assert!(previous.is_subset(&current), "radius {radius} lost nodes");
            previous = current;
        }
    }

    #[test]
    fn allies_are_passed_but_not_landed_on() {
        let mut grid = open_grid(4, 1);
        grid.set_occupancy(Position::new(1, 0), Occupancy::Ally);
        let start = grid.node_id(Position::ORIGIN).unwrap();

        let reach = grid.reachable_for_movement(start, 2, Faction::Ally);

        assert_eq!(
            positions(&grid, &reach),
            vec![Position::new(0, 0), Position::new(2, 0)]
        );
    }

    #[test]
    fn opponents_neither_land_nor_pass() {
        let mut grid = open_grid(4, 1);
        grid.set_occupancy(Position::new(1, 0), Occupancy::Enemy);
        let start = grid.node_id(Position::ORIGIN).unwrap();

        let reach = grid.reachable_for_movement(start, 3, Faction::Ally);

        assert_eq!(positions(&grid, &reach), vec![Position::new(0, 0)]);
    }

    #[test]
    fn attack_reach_sees_through_walls() {
        let mut grid = open_grid(3, 1);
        grid.set_occupancy(Position::new(1, 0), Occupancy::Wall);
        let start = grid.node_id(Position::ORIGIN).unwrap();

        let reach = grid.reachable_for_attack(&NodeSet::from([start]), 2);

        assert_eq!(
            positions(&grid, &reach),
            vec![Position::new(1, 0), Position::new(2, 0)]
        );
    }

    #[test]
    fn nodes_within_distance_excludes_origin() {
        let grid = open_grid(5, 5);
        let start = grid.node_id(Position::new(2, 2)).unwrap();

        let ring = grid.nodes_within_distance(start, 1);

        assert_eq!(ring.len(), 4);
        assert!(!ring.contains(&start));
        assert_eq!(grid.nodes_within_distance(start, 2).len(), 12);
    }
}
