/// Tactical engine constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TacticsConfig {
    /// Upper bound on open-list pops in a single pathing search.
    /// Searches that hit the cap abort with `PathError::MaxIterationsExceeded`.
    pub max_search_iterations: u32,

    /// Manhattan radius within which an enemy notices hostile units.
    pub aggro_radius: u32,

    /// Interpolated movement speed in tiles per second.
    pub move_speed: f32,

    /// Distance under which a moving unit snaps onto its hop target.
    pub arrival_epsilon: f32,
}

impl TacticsConfig {
    // ===== compile-time limits =====
    /// Largest lattice a floor may allocate (width * height).
    pub const MAX_GRID_CELLS: usize = 1 << 20;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_SEARCH_ITERATIONS: u32 = 10_000;
    pub const DEFAULT_AGGRO_RADIUS: u32 = 8;
    pub const DEFAULT_MOVE_SPEED: f32 = 6.0;
    pub const DEFAULT_ARRIVAL_EPSILON: f32 = 0.01;

    pub fn new() -> Self {
        Self {
            max_search_iterations: Self::DEFAULT_MAX_SEARCH_ITERATIONS,
            aggro_radius: Self::DEFAULT_AGGRO_RADIUS,
            move_speed: Self::DEFAULT_MOVE_SPEED,
            arrival_epsilon: Self::DEFAULT_ARRIVAL_EPSILON,
        }
    }

    #[must_use]
    pub fn with_max_search_iterations(mut self, limit: u32) -> Self {
        self.max_search_iterations = limit;
        self
    }

    #[must_use]
    pub fn with_aggro_radius(mut self, radius: u32) -> Self {
        self.aggro_radius = radius;
        self
    }

    #[must_use]
    pub fn with_move_speed(mut self, tiles_per_second: f32) -> Self {
        self.move_speed = tiles_per_second;
        self
    }
}

impl Default for TacticsConfig {
    fn default() -> Self {
        Self::new()
    }
}
