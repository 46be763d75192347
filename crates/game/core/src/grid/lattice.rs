use arrayvec::ArrayVec;

use super::{Direction, GridBounds, Node, NodeId, Occupancy, Position, WorldPos};

/// Dense lattice with exactly one node per integer coordinate inside the bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    bounds: GridBounds,
    nodes: Vec<Node>,
}

impl Grid {
    /// Allocates an empty lattice covering `bounds`.
    ///
    /// Callers are expected to have checked `bounds.cell_count()` against
    /// `TacticsConfig::MAX_GRID_CELLS`.
    pub fn new(bounds: GridBounds) -> Self {
        let nodes = (0..bounds.cell_count())
            .map(|index| Node::new(bounds.position_of(index)))
            .collect();
        Self { bounds, nodes }
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// O(1) bounds-checked lookup; out of bounds is a miss, not an error.
    pub fn node_id(&self, position: Position) -> Option<NodeId> {
        self.bounds
            .index_of(position)
            .map(|index| NodeId(index as u32))
    }

    pub fn node_at(&self, position: Position) -> Option<&Node> {
        self.node_id(position).map(|id| &self.nodes[id.index()])
    }

    /// Rounds a continuous coordinate to the nearest cell.
    pub fn node_at_world(&self, position: WorldPos) -> Option<&Node> {
        self.node_at(position.round())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn position_of(&self, id: NodeId) -> Option<Position> {
        self.node(id).map(Node::position)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index as u32), node))
    }

    pub fn occupancy(&self, position: Position) -> Option<Occupancy> {
        self.node_at(position).map(Node::occupying)
    }

    /// Overwrites a node's occupancy. Returns false if the position is off-grid.
    pub fn set_occupancy(&mut self, position: Position, occupancy: Occupancy) -> bool {
        match self.node_id(position) {
            Some(id) => {
                self.nodes[id.index()].occupying = occupancy;
                true
            }
            None => false,
        }
    }

    /// In-bounds orthogonal neighbours, in `Direction::ALL` order.
    pub fn neighbors(&self, id: NodeId) -> ArrayVec<NodeId, 4> {
        let mut out = ArrayVec::new();
        let Some(origin) = self.position_of(id) else {
            return out;
        };
        for direction in Direction::ALL {
            if let Some(next) = origin
                .offset(direction)
                .and_then(|position| self.node_id(position))
            {
                out.push(next);
            }
        }
        out
    }

    /// Clears `where_to_go`, `parent` and G/H/F on every node.
    pub fn reset_pathing(&mut self) {
        for node in &mut self.nodes {
            node.reset_scratch();
        }
    }
}
