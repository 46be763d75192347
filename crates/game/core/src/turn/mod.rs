//! Turn phase state machine.
//!
//! [`TurnController`] holds no unit state of its own; every call takes the
//! [`Battlefield`] it governs. Transitions requested while
//! [`PendingResolutions`] is non-zero are parked and committed by
//! [`TurnController::poll`] once the last [`ResolutionGuard`] drops.
mod pending;

pub use pending::{PendingResolutions, ResolutionGuard};

use crate::battlefield::Battlefield;
use crate::grid::Faction;
use crate::unit::Unit;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TurnPhase {
    /// Initial, paused or finished floor.
    #[default]
    GameStop,
    PlayerTurn,
    EnemyTurn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum FloorOutcome {
    /// No enemy left standing.
    Victory,
    /// No ally left standing.
    Defeat,
}

/// A committed transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseChange {
    pub from: TurnPhase,
    pub to: TurnPhase,
    /// Player-turn count at commit time.
    pub round: u32,
}

#[derive(Debug, Default)]
pub struct TurnController {
    phase: TurnPhase,
    round: u32,
    outcome: Option<FloorOutcome>,
    deferred: Option<TurnPhase>,
    pending: PendingResolutions,
}

impl TurnController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn outcome(&self) -> Option<FloorOutcome> {
        self.outcome
    }

    /// Transition parked behind outstanding resolutions, if any.
    pub fn deferred(&self) -> Option<TurnPhase> {
        self.deferred
    }

    pub fn pending(&self) -> &PendingResolutions {
        &self.pending
    }

    pub fn resolution_guard(&self) -> ResolutionGuard {
        self.pending.guard()
    }

    /// Player commands are only honoured during an unobstructed player turn.
    pub fn accepts_player_input(&self) -> bool {
        self.phase == TurnPhase::PlayerTurn
            && self.outcome.is_none()
            && self.deferred.is_none()
            && self.pending.is_clear()
    }

    /// Floor is ready: `GameStop -> PlayerTurn`.
    pub fn start_player_turn(&mut self, battlefield: &mut Battlefield) -> Option<PhaseChange> {
        if self.phase != TurnPhase::GameStop {
            tracing::debug!(target: "tactics::turn", phase = %self.phase, "floor already running");
            return None;
        }
        self.request(battlefield, TurnPhase::PlayerTurn)
    }

    /// Every ally has both moved and acted.
    pub fn is_player_done(&self, battlefield: &Battlefield) -> bool {
        battlefield.units().of_faction(Faction::Ally).all(Unit::is_done)
    }

    /// Poll after every player command. Hands the turn to the enemy once all
    /// allies are spent and their last action has resolved.
    pub fn check_player_done(&mut self, battlefield: &mut Battlefield) -> Option<PhaseChange> {
        if self.phase != TurnPhase::PlayerTurn
            || !battlefield.is_idle()
            || !self.is_player_done(battlefield)
        {
            return None;
        }
        self.request(battlefield, TurnPhase::EnemyTurn)
    }

    /// Explicit end of the player turn.
    pub fn end_player_turn(&mut self, battlefield: &mut Battlefield) -> Option<PhaseChange> {
        if self.phase != TurnPhase::PlayerTurn {
            tracing::debug!(target: "tactics::turn", phase = %self.phase, "end turn outside player turn");
            return None;
        }
        self.request(battlefield, TurnPhase::EnemyTurn)
    }

    /// The enemy sequencer has run out of units.
    pub fn finish_enemy_turn(&mut self, battlefield: &mut Battlefield) -> Option<PhaseChange> {
        if self.phase != TurnPhase::EnemyTurn {
            tracing::debug!(target: "tactics::turn", phase = %self.phase, "enemy turn finished twice");
            return None;
        }
        self.request(battlefield, TurnPhase::PlayerTurn)
    }

    /// Commits `to` now, or parks it until outstanding resolutions clear.
    pub fn request(&mut self, battlefield: &mut Battlefield, to: TurnPhase) -> Option<PhaseChange> {
        if self.outcome.is_some() {
            return None;
        }
        if !self.pending.is_clear() {
            tracing::debug!(
                target: "tactics::turn",
                to = %to,
                pending = self.pending.count(),
                "transition deferred"
            );
            self.deferred = Some(to);
            return None;
        }
        Some(self.commit(battlefield, to))
    }

    /// Per-tick housekeeping: decides the floor once a faction is wiped out,
    /// then commits any parked transition.
    pub fn poll(&mut self, battlefield: &mut Battlefield) -> Option<PhaseChange> {
        if !self.pending.is_clear() || self.outcome.is_some() {
            return None;
        }

        if self.phase != TurnPhase::GameStop || self.deferred.is_some() {
            let outcome = if battlefield.living(Faction::Ally) == 0 {
                Some(FloorOutcome::Defeat)
            } else if battlefield.living(Faction::Enemy) == 0 {
                Some(FloorOutcome::Victory)
            } else {
                None
            };
            if let Some(outcome) = outcome {
                self.outcome = Some(outcome);
                self.deferred = None;
                tracing::info!(target: "tactics::turn", outcome = %outcome, round = self.round, "floor decided");
                return Some(self.commit(battlefield, TurnPhase::GameStop));
            }
        }

        let to = self.deferred.take()?;
        Some(self.commit(battlefield, to))
    }

    fn commit(&mut self, battlefield: &mut Battlefield, to: TurnPhase) -> PhaseChange {
        let from = self.phase;
        self.phase = to;
        self.deferred = None;

        match to {
            TurnPhase::PlayerTurn => {
                self.round += 1;
                battlefield.reset_faction(Faction::Ally);
            }
            TurnPhase::EnemyTurn => battlefield.reset_faction(Faction::Enemy),
            TurnPhase::GameStop => {}
        }

        tracing::info!(target: "tactics::turn", from = %from, to = %to, round = self.round, "phase changed");
        PhaseChange {
            from,
            to,
            round: self.round,
        }
    }
}
