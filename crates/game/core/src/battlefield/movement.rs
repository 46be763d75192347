use crate::error::{ErrorContext, ErrorSeverity, GameError};
use crate::event::BattleEvent;
use crate::grid::{NodeId, NodeSet, PathError, Position};
use crate::unit::{Motion, TurnFlags, UnitId};

use super::Battlefield;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveError {
    #[error("unit {0} not found")]
    UnitNotFound(UnitId),

    #[error("unit {0} is already moving or acting")]
    Busy(UnitId),

    #[error("unit {0} has already moved this turn")]
    AlreadyMoved(UnitId),

    #[error("unit {unit} stands off the grid at {position}")]
    OffGrid { unit: UnitId, position: Position },

    #[error("destination {destination} is not among unit {unit}'s move tiles")]
    OutOfReach { unit: UnitId, destination: Position },

    #[error(transparent)]
    Path(#[from] PathError),
}

impl GameError for MoveError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnitNotFound(_) | Self::Busy(_) | Self::AlreadyMoved(_) => {
                ErrorSeverity::Validation
            }
            Self::OffGrid { .. } => ErrorSeverity::Internal,
            Self::OutOfReach { .. } => ErrorSeverity::Recoverable,
            Self::Path(inner) => inner.severity(),
        }
    }

    fn context(&self) -> ErrorContext {
        match self {
            Self::UnitNotFound(unit) | Self::Busy(unit) | Self::AlreadyMoved(unit) => {
                ErrorContext::new().with_unit(*unit)
            }
            Self::OffGrid { unit, position } => {
                ErrorContext::new().with_unit(*unit).with_position(*position)
            }
            Self::OutOfReach { unit, destination } => ErrorContext::new()
                .with_unit(*unit)
                .with_position(*destination),
            Self::Path(_) => ErrorContext::new(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnitNotFound(_) => "MOVE_UNIT_NOT_FOUND",
            Self::Busy(_) => "MOVE_BUSY",
            Self::AlreadyMoved(_) => "MOVE_ALREADY_MOVED",
            Self::OffGrid { .. } => "MOVE_OFF_GRID",
            Self::OutOfReach { .. } => "MOVE_OUT_OF_REACH",
            Self::Path(inner) => inner.error_code(),
        }
    }
}

impl Battlefield {
    /// Recomputes the unit's landing set from its current node and move range.
    pub fn calc_move_tiles(&mut self, id: UnitId) -> Option<&NodeSet> {
        let unit = self.units.get(id)?;
        let tiles = match self.grid.node_id(unit.grid_position()) {
            Some(start) => {
                self.grid
                    .reachable_for_movement(start, unit.move_range(), unit.faction())
            }
            None => NodeSet::new(),
        };

        let unit = self.units.get_mut(id)?;
        unit.move_tiles = tiles;
        Some(&unit.move_tiles)
    }

    /// Recomputes the attack set from the current move tiles.
    pub fn calc_attack_tiles(&mut self, id: UnitId) -> Option<&NodeSet> {
        let unit = self.units.get(id)?;
        let tiles = self
            .grid
            .reachable_for_attack(unit.move_tiles(), unit.attack_range());

        let unit = self.units.get_mut(id)?;
        unit.attack_tiles = tiles;
        Some(&unit.attack_tiles)
    }

    /// Move tiles then attack tiles, in that order.
    pub fn refresh_tiles(&mut self, id: UnitId) -> bool {
        self.calc_move_tiles(id).is_some() && self.calc_attack_tiles(id).is_some()
    }

    /// Routes the unit toward `destination` and starts the interpolated walk.
    ///
    /// Completion is signalled later by `BattleEvent::FinishedMoving`, raised from
    /// [`Battlefield::advance`]. Choosing the unit's own cell settles in place
    /// immediately.
    pub fn start_move(&mut self, id: UnitId, destination: Position) -> Result<(), MoveError> {
        let unit = self.units.get(id).ok_or(MoveError::UnitNotFound(id))?;
        if unit.is_busy() {
            return Err(MoveError::Busy(id));
        }
        if unit.has_moved() {
            return Err(MoveError::AlreadyMoved(id));
        }

        let faction = unit.faction();
        let position = unit.grid_position();
        let origin = self
            .grid
            .node_id(position)
            .ok_or(MoveError::OffGrid { unit: id, position })?;
        let target = self
            .grid
            .node_id(destination)
            .ok_or(PathError::MissingDestination)?;

        let reachable = self
            .calc_move_tiles(id)
            .is_some_and(|tiles| tiles.contains(&target));
        if !reachable {
            return Err(MoveError::OutOfReach {
                unit: id,
                destination,
            });
        }

        if target == origin {
            self.finish_move(id, origin);
            return Ok(());
        }

        let query = self.query(Some(origin), Some(target), faction, true);
        self.search(&query)?;
        let route = self
            .grid
            .route_from(origin)
            .filter(|route| !route.is_empty())
            .ok_or(PathError::Unreachable {
                start: position,
                destination,
            })?;

        let unit = self.units.get_mut(id).ok_or(MoveError::UnitNotFound(id))?;
        unit.motion = Motion::Moving {
            from: origin,
            route: route.into(),
        };

        tracing::debug!(
            target: "tactics::movement",
            unit = %id,
            from = %position,
            to = %destination,
            "move started"
        );
        self.emit(BattleEvent::MoveStarted {
            unit: id,
            from: position,
            to: destination,
        });
        Ok(())
    }

    /// Advances every moving unit by `dt` seconds of travel.
    pub fn advance(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let budget = self.config.move_speed * dt;
        let moving: Vec<UnitId> = self
            .units
            .iter()
            .filter(|unit| unit.is_moving())
            .map(|unit| unit.id())
            .collect();

        for id in moving {
            self.step_unit(id, budget);
        }
    }

    /// Walks one unit along its route, settling X before Y on every hop.
    fn step_unit(&mut self, id: UnitId, mut budget: f32) {
        let epsilon = self.config.arrival_epsilon;

        for _ in 0..=self.grid.len() {
            let Some((from, toward)) = self.units.get(id).and_then(|unit| match unit.motion() {
                Motion::Moving { from, route } => route.front().map(|next| (*from, *next)),
                Motion::Idle => None,
            }) else {
                return;
            };
            let Some(target) = self.grid.position_of(toward).map(Position::to_world) else {
                tracing::warn!(target: "tactics::movement", unit = %id, node = %toward, "route left the grid");
                self.finish_move(id, from);
                return;
            };

            let Some(unit) = self.units.get_mut(id) else {
                return;
            };
            budget = step_axis(&mut unit.position.x, target.x, budget, epsilon);
            if unit.position.x != target.x {
                return;
            }
            budget = step_axis(&mut unit.position.y, target.y, budget, epsilon);
            if unit.position.y != target.y {
                return;
            }

            self.arrive(id, from, toward);
            if budget <= 0.0 {
                return;
            }
        }
    }

    /// Hop target reached: vacate the previous cell and either continue or settle.
    fn arrive(&mut self, id: UnitId, from: NodeId, reached: NodeId) {
        if let Some(vacated) = self.grid.position_of(from)
            && !self.units.anyone_else_at(vacated, id)
        {
            self.grid.set_occupancy(vacated, crate::grid::Occupancy::Empty);
        }

        let Some(unit) = self.units.get_mut(id) else {
            return;
        };
        let arrived = match &mut unit.motion {
            Motion::Moving { from, route } => {
                route.pop_front();
                *from = reached;
                route.is_empty()
            }
            Motion::Idle => false,
        };

        if arrived {
            self.finish_move(id, reached);
        }
    }

    /// Settles the unit on `node`, spends its move and raises the completion signal.
    fn finish_move(&mut self, id: UnitId, node: NodeId) {
        let Some(position) = self.grid.position_of(node) else {
            return;
        };
        let Some(unit) = self.units.get_mut(id) else {
            return;
        };
        unit.position = position.to_world();
        unit.motion = Motion::Idle;
        unit.flags |= TurnFlags::MOVED;
        unit.move_range = 0;
        let marker = unit.faction().occupancy();

        self.grid.set_occupancy(position, marker);
        self.refresh_tiles(id);

        tracing::debug!(target: "tactics::movement", unit = %id, at = %position, "move finished");
        self.emit(BattleEvent::FinishedMoving {
            unit: id,
            at: position,
        });
    }
}

/// Moves `value` toward `target` by at most `budget`, snapping inside `epsilon`.
/// Returns the unspent budget.
fn step_axis(value: &mut f32, target: f32, budget: f32, epsilon: f32) -> f32 {
    let gap = target - *value;
    if gap.abs() <= epsilon {
        *value = target;
        return budget;
    }
    let step = gap.abs().min(budget);
    *value += step * gap.signum();
    if (target - *value).abs() <= epsilon {
        *value = target;
    }
    budget - step
}
