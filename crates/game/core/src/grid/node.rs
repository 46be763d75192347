use super::{NodeId, Occupancy, Position};

/// One cell of the tactical lattice.
///
/// `where_to_go`, `parent` and the G/H/F costs are search scratch: they are only
/// meaningful right after the pathing call that wrote them and are wiped by the
/// next `reset_pathing`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    position: Position,
    pub(crate) occupying: Occupancy,
    pub(crate) where_to_go: Option<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) g: i32,
    pub(crate) h: i32,
    pub(crate) f: i32,
}

impl Node {
    pub(crate) fn new(position: Position) -> Self {
        Self {
            position,
            occupying: Occupancy::Empty,
            where_to_go: None,
            parent: None,
            g: 0,
            h: 0,
            f: 0,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn occupying(&self) -> Occupancy {
        self.occupying
    }

    pub fn is_empty(&self) -> bool {
        self.occupying.is_empty()
    }

    /// Next hop on the most recent path; points at itself on the destination.
    pub fn where_to_go(&self) -> Option<NodeId> {
        self.where_to_go
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn g(&self) -> i32 {
        self.g
    }

    pub fn h(&self) -> i32 {
        self.h
    }

    pub fn f(&self) -> i32 {
        self.f
    }

    pub(crate) fn reset_scratch(&mut self) {
        self.where_to_go = None;
        self.parent = None;
        self.g = 0;
        self.h = 0;
        self.f = 0;
    }
}
