use crate::error::{ErrorContext, ErrorSeverity, GameError};
use crate::event::BattleEvent;
use crate::grid::{NodeId, Occupancy, Position};
use crate::unit::{ActionHandle, PendingAction, TurnFlags, UnitId};

use super::Battlefield;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    #[error("unit {0} not found")]
    UnitNotFound(UnitId),

    #[error("unit {0} is already moving or acting")]
    Busy(UnitId),

    #[error("unit {0} has already acted this turn")]
    AlreadyActed(UnitId),

    #[error("target {target} of unit {unit} is off the grid")]
    TargetOffGrid { unit: UnitId, target: Position },

    #[error("target {target} is out of unit {unit}'s range")]
    OutOfRange { unit: UnitId, target: Position },

    #[error("target {target} of unit {unit} is not interactable ({occupant})")]
    NotInteractable {
        unit: UnitId,
        target: Position,
        occupant: Occupancy,
    },
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnitNotFound(_) | Self::Busy(_) | Self::AlreadyActed(_) => {
                ErrorSeverity::Validation
            }
            Self::TargetOffGrid { .. } | Self::NotInteractable { .. } => ErrorSeverity::Validation,
            Self::OutOfRange { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn context(&self) -> ErrorContext {
        match self {
            Self::UnitNotFound(unit) | Self::Busy(unit) | Self::AlreadyActed(unit) => {
                ErrorContext::new().with_unit(*unit)
            }
            Self::TargetOffGrid { unit, target }
            | Self::OutOfRange { unit, target }
            | Self::NotInteractable { unit, target, .. } => {
                ErrorContext::new().with_unit(*unit).with_position(*target)
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnitNotFound(_) => "ACTION_UNIT_NOT_FOUND",
            Self::Busy(_) => "ACTION_BUSY",
            Self::AlreadyActed(_) => "ACTION_ALREADY_ACTED",
            Self::TargetOffGrid { .. } => "ACTION_TARGET_OFF_GRID",
            Self::OutOfRange { .. } => "ACTION_OUT_OF_RANGE",
            Self::NotInteractable { .. } => "ACTION_NOT_INTERACTABLE",
        }
    }
}

impl Battlefield {
    /// Begins an attack on whatever will stand on `target` when it resolves.
    ///
    /// The target must be within attack range of the unit's current node. The
    /// unit's action is spent immediately; damage is applied by
    /// [`Battlefield::complete_action`] (or [`Battlefield::end_attack`]).
    pub fn start_attack(&mut self, id: UnitId, target: Position) -> Result<ActionHandle, ActionError> {
        let (origin, range) = self.ready_to_act(id)?;
        let target_node = self.target_node(id, target)?;
        if !self
            .grid
            .nodes_within_distance(origin, range)
            .contains(&target_node)
        {
            return Err(ActionError::OutOfRange { unit: id, target });
        }

        let handle = self.next_handle(id);
        self.occupy_action_slot(id, PendingAction::Attack { handle, target })?;

        tracing::debug!(target: "tactics::combat", unit = %id, target = %target, handle = %handle, "attack started");
        self.emit(BattleEvent::AttackStarted {
            unit: id,
            target,
            handle,
        });
        Ok(handle)
    }

    /// Begins an interaction with an orthogonally adjacent interactable.
    pub fn start_interact(&mut self, id: UnitId, target: Position) -> Result<ActionHandle, ActionError> {
        let (origin, _) = self.ready_to_act(id)?;
        let target_node = self.target_node(id, target)?;
        let occupant = self
            .grid
            .node(target_node)
            .map_or(Occupancy::Empty, |node| node.occupying());
        if occupant != Occupancy::Interactable {
            return Err(ActionError::NotInteractable {
                unit: id,
                target,
                occupant,
            });
        }
        if !self.grid.neighbors(origin).contains(&target_node) {
            return Err(ActionError::OutOfRange { unit: id, target });
        }

        let handle = self.next_handle(id);
        self.occupy_action_slot(id, PendingAction::Interact { handle, target })?;

        tracing::debug!(target: "tactics::combat", unit = %id, target = %target, handle = %handle, "interaction started");
        self.emit(BattleEvent::InteractStarted {
            unit: id,
            target,
            handle,
        });
        Ok(handle)
    }

    /// Second half of the action protocol: resolves the action behind `handle`
    /// and raises `FinishedAction`.
    ///
    /// Unknown or stale handles are logged and ignored.
    pub fn complete_action(&mut self, handle: ActionHandle) -> bool {
        let Some(unit) = self.units.get_mut(handle.unit) else {
            tracing::debug!(target: "tactics::combat", handle = %handle, "completion for a unit that is gone");
            return false;
        };
        let pending = match unit.pending {
            Some(pending) if pending.handle() == handle => pending,
            _ => {
                tracing::debug!(target: "tactics::combat", handle = %handle, "stale action handle");
                return false;
            }
        };
        unit.pending = None;

        match pending {
            PendingAction::Attack { target, .. } => self.resolve_attack(handle.unit, target),
            PendingAction::Interact { target, .. } => {
                tracing::debug!(target: "tactics::combat", unit = %handle.unit, at = %target, "interacted");
                self.emit(BattleEvent::Interacted {
                    unit: handle.unit,
                    at: target,
                });
            }
        }

        self.emit(BattleEvent::FinishedAction { unit: handle.unit });
        true
    }

    /// Concludes the unit's pending attack, if it has one.
    pub fn end_attack(&mut self, id: UnitId) -> bool {
        match self.units.get(id).and_then(|unit| unit.pending().copied()) {
            Some(pending @ PendingAction::Attack { .. }) => self.complete_action(pending.handle()),
            _ => false,
        }
    }

    /// Damage lands on the unit standing on `target` right now, which may
    /// differ from the one there when the attack began.
    fn resolve_attack(&mut self, attacker: UnitId, target: Position) {
        let damage = self
            .units
            .get(attacker)
            .map_or(0, |unit| unit.stats().attack_power);
        let victim = self
            .grid
            .node_id(target)
            .and_then(|node| self.occupant_at(node));

        let Some(victim) = victim else {
            tracing::debug!(
                target: "tactics::combat",
                attacker = %attacker,
                position = %target,
                "attack resolved against no target"
            );
            self.emit(BattleEvent::AttackResolved {
                attacker,
                target: None,
                damage: 0,
            });
            return;
        };

        let remaining = match self.units.get_mut(victim) {
            Some(unit) => {
                unit.health = unit.health.saturating_sub(damage);
                unit.health
            }
            None => return,
        };

        tracing::debug!(
            target: "tactics::combat",
            attacker = %attacker,
            victim = %victim,
            damage,
            remaining,
            "attack resolved"
        );
        self.emit(BattleEvent::AttackResolved {
            attacker,
            target: Some(victim),
            damage,
        });

        if remaining == 0 {
            self.remove_unit(victim);
        }
    }

    fn ready_to_act(&self, id: UnitId) -> Result<(NodeId, u32), ActionError> {
        let unit = self.units.get(id).ok_or(ActionError::UnitNotFound(id))?;
        if unit.is_busy() {
            return Err(ActionError::Busy(id));
        }
        if unit.has_attacked() {
            return Err(ActionError::AlreadyActed(id));
        }
        let origin = self
            .grid
            .node_id(unit.grid_position())
            .ok_or(ActionError::TargetOffGrid {
                unit: id,
                target: unit.grid_position(),
            })?;
        Ok((origin, unit.attack_range()))
    }

    fn target_node(&self, id: UnitId, target: Position) -> Result<NodeId, ActionError> {
        self.grid
            .node_id(target)
            .ok_or(ActionError::TargetOffGrid { unit: id, target })
    }

    fn occupy_action_slot(&mut self, id: UnitId, pending: PendingAction) -> Result<(), ActionError> {
        let unit = self.units.get_mut(id).ok_or(ActionError::UnitNotFound(id))?;
        unit.flags |= TurnFlags::ATTACKED;
        unit.pending = Some(pending);
        Ok(())
    }
}
