use std::collections::BTreeSet;
use std::fmt;

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbouring cell, or None past the edge of the coordinate space.
    pub fn offset(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.delta();
        Some(Self::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }

    pub fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// Squared euclidean distance, the pathing heuristic. Saturates at
    /// `i32::MAX` on very wide floors.
    pub fn distance_squared(self, other: Self) -> i32 {
        let dx = u64::from(self.x.abs_diff(other.x));
        let dy = u64::from(self.y.abs_diff(other.y));
        i32::try_from((dx * dx).saturating_add(dy * dy)).unwrap_or(i32::MAX)
    }

    pub fn to_world(self) -> WorldPos {
        WorldPos::new(self.x as f32, self.y as f32)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Continuous coordinate of a unit mid-move.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Nearest integer cell.
    pub fn round(self) -> Position {
        Position::new(self.x.round() as i32, self.y.round() as i32)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Orthogonal neighbours only; diagonal steps are not part of the lattice.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }
}

/// Which side a unit fights for.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Faction {
    Ally,
    Enemy,
}

impl Faction {
    pub const fn opponent(self) -> Self {
        match self {
            Faction::Ally => Faction::Enemy,
            Faction::Enemy => Faction::Ally,
        }
    }

    /// Occupancy marker written into a node when a unit of this faction settles there.
    pub const fn occupancy(self) -> Occupancy {
        match self {
            Faction::Ally => Occupancy::Ally,
            Faction::Enemy => Occupancy::Enemy,
        }
    }
}

/// What currently fills a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Occupancy {
    #[default]
    Empty,
    Wall,
    Ally,
    Enemy,
    Interactable,
}

impl Occupancy {
    pub const fn is_empty(self) -> bool {
        matches!(self, Occupancy::Empty)
    }

    pub const fn faction(self) -> Option<Faction> {
        match self {
            Occupancy::Ally => Some(Faction::Ally),
            Occupancy::Enemy => Some(Faction::Enemy),
            _ => None,
        }
    }

    /// A cell is enterable if it is empty or held by the mover's own side.
    /// Same-side cells may be walked through but never stopped on.
    pub fn is_passable_for(self, faction: Faction) -> bool {
        self.is_empty() || self.faction() == Some(faction)
    }

    pub fn is_hostile_to(self, faction: Faction) -> bool {
        self.faction() == Some(faction.opponent())
    }
}

/// Index of a node inside the dense lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Ordered node set; iteration follows lattice order so every consumer sees
/// the same tie-break sequence.
pub type NodeSet = BTreeSet<NodeId>;

/// Inclusive integer bounds of a floor's lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridBounds {
    min: Position,
    max: Position,
}

impl GridBounds {
    /// Builds bounds from the two corners the floor generator hands over.
    ///
    /// By convention `top_left` is (min x, max y) and `bot_right` is (max x, min y),
    /// but the corners are normalized so either order works.
    pub fn from_corners(top_left: Position, bot_right: Position) -> Self {
        Self {
            min: Position::new(top_left.x.min(bot_right.x), top_left.y.min(bot_right.y)),
            max: Position::new(top_left.x.max(bot_right.x), top_left.y.max(bot_right.y)),
        }
    }

    pub fn min(&self) -> Position {
        self.min
    }

    pub fn max(&self) -> Position {
        self.max
    }

    pub fn top_left(&self) -> Position {
        Position::new(self.min.x, self.max.y)
    }

    pub fn bot_right(&self) -> Position {
        Position::new(self.max.x, self.min.y)
    }

    /// Saturates at `u32::MAX` for bounds spanning the whole `i32` range.
    pub fn width(&self) -> u32 {
        self.max.x.abs_diff(self.min.x).saturating_add(1)
    }

    pub fn height(&self) -> u32 {
        self.max.y.abs_diff(self.min.y).saturating_add(1)
    }

    pub fn cell_count(&self) -> usize {
        (self.width() as usize).saturating_mul(self.height() as usize)
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= self.min.x
            && position.y >= self.min.y
            && position.x <= self.max.x
            && position.y <= self.max.y
    }

    /// Row-major index obtained by subtracting the origin.
    pub fn index_of(&self, position: Position) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }
        let column = position.x.abs_diff(self.min.x) as usize;
        let row = position.y.abs_diff(self.min.y) as usize;
        Some(row * self.width() as usize + column)
    }

    pub fn position_of(&self, index: usize) -> Position {
        let width = self.width() as usize;
        Position::new(
            self.min.x + (index % width) as i32,
            self.min.y + (index / width) as i32,
        )
    }
}
