//! Enemy turn sequencing.
//!
//! One enemy acts at a time through a strict chain:
//! `take turn -> FinishedMoving -> attempt action -> FinishedAction -> next`.
//! An enemy with nowhere useful to go skips straight to its action, and one
//! with nothing to do hands over immediately.

use std::collections::VecDeque;

use tactics_core::{BattleEvent, Battlefield, Faction, UnitId};

use crate::events::TurnEvent;
use crate::providers::StrategyRegistry;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SequencerState {
    /// Not the enemy's turn.
    #[default]
    Idle,
    /// Ready to hand control to the next enemy.
    Deciding,
    AwaitingMove(UnitId),
    AwaitingAction(UnitId),
    /// Every enemy in the snapshot has acted.
    Finished,
}

pub struct EnemyTurnSequencer {
    strategies: StrategyRegistry,
    queue: VecDeque<UnitId>,
    state: SequencerState,
}

impl EnemyTurnSequencer {
    pub fn new(strategies: StrategyRegistry) -> Self {
        Self {
            strategies,
            queue: VecDeque::new(),
            state: SequencerState::Idle,
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == SequencerState::Finished
    }

    /// Enemies still waiting for their go.
    pub fn remaining(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.queue.iter().copied()
    }

    /// Snapshots the living enemies in roster order.
    pub fn begin(&mut self, battlefield: &Battlefield) -> TurnEvent {
        self.queue = battlefield
            .units()
            .of_faction(Faction::Enemy)
            .filter(|unit| unit.is_alive())
            .map(|unit| unit.id())
            .collect();
        self.state = SequencerState::Deciding;

        tracing::info!(target: "runtime::sequencer", enemies = self.queue.len(), "enemy turn started");
        TurnEvent::EnemyTurnStarted {
            enemies: self.queue.len(),
        }
    }

    /// Back to idle, dropping whatever was left of the snapshot.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.state = SequencerState::Idle;
    }

    /// Hands control to enemies until one of them is waiting on a completion
    /// signal or the snapshot runs out.
    pub fn pump(&mut self, battlefield: &mut Battlefield) -> Vec<TurnEvent> {
        let mut events = Vec::new();

        while self.state == SequencerState::Deciding {
            let Some(id) = self.queue.pop_front() else {
                self.state = SequencerState::Finished;
                tracing::info!(target: "runtime::sequencer", "enemy turn complete");
                break;
            };
            if let Some(event) = self.take_turn(battlefield, id) {
                events.push(event);
            }
        }

        events
    }

    /// Advances the chain on the completion signal of the enemy in control.
    pub fn on_event(&mut self, battlefield: &mut Battlefield, event: &BattleEvent) {
        match (event, self.state) {
            (BattleEvent::FinishedMoving { unit, .. }, SequencerState::AwaitingMove(current))
                if *unit == current =>
            {
                self.attempt_action(battlefield, current);
            }
            (BattleEvent::FinishedAction { unit }, SequencerState::AwaitingAction(current))
                if *unit == current =>
            {
                tracing::debug!(target: "runtime::sequencer", unit = %unit, "enemy done");
                self.state = SequencerState::Deciding;
            }
            _ => {}
        }
    }

    fn take_turn(&mut self, battlefield: &mut Battlefield, id: UnitId) -> Option<TurnEvent> {
        let Some(unit) = battlefield.unit(id).filter(|unit| unit.is_alive()) else {
            tracing::debug!(target: "runtime::sequencer", unit = %id, "enemy gone, skipping");
            return None;
        };
        let behavior = unit.behavior();
        let here = unit.grid_position();
        let Some(strategy) = self.strategies.get(behavior) else {
            tracing::warn!(target: "runtime::sequencer", unit = %id, behavior = %behavior, "no strategy registered");
            return None;
        };

        tracing::debug!(
            target: "runtime::sequencer",
            unit = %id,
            strategy = strategy.name(),
            "enemy taking turn"
        );

        match strategy.find_tile_to_move_to(battlefield, id) {
            Some(tile) if tile != here => match battlefield.start_move(id, tile) {
                Ok(()) => self.state = SequencerState::AwaitingMove(id),
                Err(error) => {
                    tracing::debug!(target: "runtime::sequencer", unit = %id, error = %error, "move rejected");
                    self.attempt_action(battlefield, id);
                }
            },
            _ => self.attempt_action(battlefield, id),
        }

        Some(TurnEvent::EnemyActing { unit: id, behavior })
    }

    fn attempt_action(&mut self, battlefield: &mut Battlefield, id: UnitId) {
        let strategy = battlefield
            .unit(id)
            .and_then(|unit| self.strategies.get(unit.behavior()));

        let handle = strategy.and_then(|strategy| strategy.attempt_action(battlefield, id));
        self.state = match handle {
            Some(handle) => {
                tracing::debug!(target: "runtime::sequencer", unit = %id, handle = %handle, "enemy acting");
                SequencerState::AwaitingAction(id)
            }
            None => SequencerState::Deciding,
        };
    }
}

impl Default for EnemyTurnSequencer {
    fn default() -> Self {
        Self::new(StrategyRegistry::default())
    }
}

#[cfg(test)]
mod tests {
    use tactics_core::{
        BehaviorKind, FloorLayout, Position, TacticsConfig, UnitSpawn, UnitStats,
    };

    use super::*;

    const HERO: UnitId = UnitId(1);

    fn battlefield(enemies: &[(u32, Position, BehaviorKind)]) -> Battlefield {
        let mut layout = FloorLayout::new(Position::new(0, 4), Position::new(7, 0))
            .with_unit(UnitSpawn::new(HERO, Faction::Ally, Position::new(0, 2)));
        for &(id, position, behavior) in enemies {
            layout = layout.with_unit(
                UnitSpawn::new(UnitId(id), Faction::Enemy, position)
                    .with_stats(UnitStats::new(10, 1, 3, 1))
                    .with_behavior(behavior),
            );
        }
        Battlefield::from_layout(&layout, TacticsConfig::default()).unwrap()
    }

    /// Ticks the floor and feeds completion signals back, resolving every
    /// action immediately. Returns how many enemies were ever busy at once.
    fn drive(battlefield: &mut Battlefield, sequencer: &mut EnemyTurnSequencer) -> usize {
        let mut most_busy = 0;
        for _ in 0..2_000 {
            sequencer.pump(battlefield);
            if sequencer.is_finished() {
                return most_busy;
            }

            let busy = battlefield
                .units()
                .of_faction(Faction::Enemy)
                .filter(|unit| unit.is_busy())
                .count();
            most_busy = most_busy.max(busy);

            battlefield.advance(0.05);
            let handles: Vec<_> = battlefield
                .units()
                .iter()
                .filter_map(|unit| unit.pending().map(|pending| pending.handle()))
                .collect();
            for handle in handles {
                battlefield.complete_action(handle);
            }
            for event in battlefield.drain_events() {
                sequencer.on_event(battlefield, &event);
            }
        }
        panic!("enemy turn never finished");
    }

    #[test]
    fn enemies_act_one_at_a_time() {
        let mut battlefield = battlefield(&[
            (10, Position::new(7, 2), BehaviorKind::Melee),
            (11, Position::new(6, 0), BehaviorKind::Melee),
        ]);
        let mut sequencer = EnemyTurnSequencer::default();

        assert_eq!(
            sequencer.begin(&battlefield),
            TurnEvent::EnemyTurnStarted { enemies: 2 }
        );
        let most_busy = drive(&mut battlefield, &mut sequencer);

        assert_eq!(most_busy, 1);
        for id in [UnitId(10), UnitId(11)] {
            assert!(battlefield.unit(id).unwrap().has_moved());
        }
    }

    #[test]
    fn idle_defender_hands_over_without_waiting() {
        let mut battlefield = battlefield(&[(10, Position::new(7, 4), BehaviorKind::DefendTile)]);
        let mut sequencer = EnemyTurnSequencer::default();

        sequencer.begin(&battlefield);
        let events = sequencer.pump(&mut battlefield);

        assert!(sequencer.is_finished());
        assert_eq!(
            events,
            vec![TurnEvent::EnemyActing {
                unit: UnitId(10),
                behavior: BehaviorKind::DefendTile,
            }]
        );
        assert!(battlefield.pending_events().is_empty());
    }

    #[test]
    fn adjacent_enemy_waits_for_its_action() {
        let mut battlefield = battlefield(&[(10, Position::new(1, 2), BehaviorKind::Melee)]);
        let mut sequencer = EnemyTurnSequencer::default();

        sequencer.begin(&battlefield);
        sequencer.pump(&mut battlefield);
        assert_eq!(sequencer.state(), SequencerState::AwaitingAction(UnitId(10)));
        assert!(!battlefield.unit(UnitId(10)).unwrap().has_moved());

        assert!(battlefield.end_attack(UnitId(10)));
        for event in battlefield.drain_events() {
            sequencer.on_event(&mut battlefield, &event);
        }
        sequencer.pump(&mut battlefield);

        assert!(sequencer.is_finished());
        assert_eq!(battlefield.unit(HERO).unwrap().health(), 9);
    }

    #[test]
    fn enemy_removed_mid_turn_is_skipped() {
        let mut battlefield = battlefield(&[
            (10, Position::new(7, 4), BehaviorKind::DefendTile),
            (11, Position::new(7, 0), BehaviorKind::Melee),
        ]);
        let mut sequencer = EnemyTurnSequencer::default();
        sequencer.begin(&battlefield);

        battlefield.remove_unit(UnitId(11));
        battlefield.drain_events();
        let events = sequencer.pump(&mut battlefield);

        assert!(sequencer.is_finished());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn enemy_removed_while_walking_does_not_stall() {
        let mut battlefield = battlefield(&[(10, Position::new(7, 2), BehaviorKind::Melee)]);
        let mut sequencer = EnemyTurnSequencer::default();
        sequencer.begin(&battlefield);
        sequencer.pump(&mut battlefield);
        assert_eq!(sequencer.state(), SequencerState::AwaitingMove(UnitId(10)));

        battlefield.advance(0.05);
        battlefield.remove_unit(UnitId(10));
        for event in battlefield.drain_events() {
            sequencer.on_event(&mut battlefield, &event);
        }
        sequencer.pump(&mut battlefield);

        assert!(sequencer.is_finished());
        assert!(battlefield.is_idle());
    }

    #[test]
    fn enemy_removed_mid_action_does_not_stall() {
        let mut battlefield = battlefield(&[(10, Position::new(1, 2), BehaviorKind::Melee)]);
        let mut sequencer = EnemyTurnSequencer::default();
        sequencer.begin(&battlefield);
        sequencer.pump(&mut battlefield);
        assert_eq!(sequencer.state(), SequencerState::AwaitingAction(UnitId(10)));

        battlefield.remove_unit(UnitId(10));
        for event in battlefield.drain_events() {
            sequencer.on_event(&mut battlefield, &event);
        }
        sequencer.pump(&mut battlefield);

        assert!(sequencer.is_finished());
        assert_eq!(battlefield.unit(HERO).unwrap().health(), 10);
    }

    #[test]
    fn foreign_completion_signals_are_ignored() {
        let mut battlefield = battlefield(&[(10, Position::new(1, 2), BehaviorKind::Melee)]);
        let mut sequencer = EnemyTurnSequencer::default();
        sequencer.begin(&battlefield);
        sequencer.pump(&mut battlefield);

        sequencer.on_event(&mut battlefield, &BattleEvent::FinishedAction { unit: HERO });

        assert_eq!(sequencer.state(), SequencerState::AwaitingAction(UnitId(10)));
    }
}
