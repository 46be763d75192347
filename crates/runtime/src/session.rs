//! Per-floor session orchestrator.
//!
//! A [`Session`] owns the battlefield, the turn controller, the enemy turn
//! sequencer and the selection orchestrator, and routes completion signals
//! between them. Hosts drive it with [`Session::tick`], feed input through
//! [`Session::select`], and observe everything through the [`EventBus`].

use tokio::sync::broadcast;

use tactics_core::{
    ActionHandle, BattleEvent, Battlefield, Faction, FloorLayout, FloorOutcome, PhaseChange,
    Position, ResolutionGuard, TacticsConfig, TurnController, TurnPhase, UnitId,
};

use crate::error::{Result, RuntimeError};
use crate::events::{Event, EventBus, SelectionEvent, Topic, TurnEvent};
use crate::providers::{SelectionOrchestrator, StrategyRegistry};
use crate::sequencer::{EnemyTurnSequencer, SequencerState};

/// Session configuration shared across the orchestrator and its parts.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub tactics: TacticsConfig,
    pub event_buffer_size: usize,
    /// Resolve attack and interaction handles on the next tick instead of
    /// waiting for the host's presentation layer.
    pub auto_complete_actions: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tactics: TacticsConfig::default(),
            event_buffer_size: 128,
            auto_complete_actions: false,
        }
    }
}

pub struct Session {
    battlefield: Battlefield,
    turns: TurnController,
    sequencer: EnemyTurnSequencer,
    selection: SelectionOrchestrator,
    bus: EventBus,
    config: SessionConfig,
}

impl Session {
    /// Create a new session builder
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Floor ready: hands the first turn to the player.
    pub fn start(&mut self) -> Result<PhaseChange> {
        if self.turns.phase() != TurnPhase::GameStop || self.turns.round() > 0 {
            return Err(RuntimeError::AlreadyStarted {
                phase: self.turns.phase(),
            });
        }
        let change = self
            .turns
            .start_player_turn(&mut self.battlefield)
            .ok_or(RuntimeError::AlreadyStarted {
                phase: self.turns.phase(),
            })?;

        tracing::info!(
            target: "runtime::session",
            width = self.battlefield.bounds().width(),
            height = self.battlefield.bounds().height(),
            allies = self.battlefield.living(Faction::Ally),
            enemies = self.battlefield.living(Faction::Enemy),
            "session started"
        );
        self.on_phase_change(change);
        self.settle();
        Ok(change)
    }

    /// One frame: interpolates movement, then routes every signal it raised.
    pub fn tick(&mut self, dt: f32) {
        self.battlefield.advance(dt);

        if self.config.auto_complete_actions {
            let handles: Vec<ActionHandle> = self
                .battlefield
                .units()
                .iter()
                .filter_map(|unit| unit.pending().map(|pending| pending.handle()))
                .collect();
            for handle in handles {
                self.battlefield.complete_action(handle);
            }
        }

        self.settle();
    }

    /// Per-frame "user selected cell" input.
    pub fn select(&mut self, position: Position) -> SelectionEvent {
        let event = self
            .selection
            .select(&mut self.battlefield, &self.turns, position);
        self.bus.publish(event.clone());
        self.settle();
        event
    }

    /// Ends the player turn explicitly.
    pub fn end_turn(&mut self) -> Option<PhaseChange> {
        let change = self.turns.end_player_turn(&mut self.battlefield);
        if let Some(change) = change {
            self.on_phase_change(change);
        }
        self.settle();
        change
    }

    /// Host reports that the presentation of an action has finished.
    pub fn complete_action(&mut self, handle: ActionHandle) -> bool {
        let completed = self.battlefield.complete_action(handle);
        self.settle();
        completed
    }

    /// Holds turn advancement until the returned guard is dropped.
    pub fn resolution_guard(&self) -> ResolutionGuard {
        self.turns.resolution_guard()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.bus.subscribe(topic)
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn battlefield(&self) -> &Battlefield {
        &self.battlefield
    }

    /// Mutable access for the stats/leveling layer. Range setters on the
    /// battlefield recompute tile caches themselves.
    pub fn battlefield_mut(&mut self) -> &mut Battlefield {
        &mut self.battlefield
    }

    pub fn turns(&self) -> &TurnController {
        &self.turns
    }

    pub fn phase(&self) -> TurnPhase {
        self.turns.phase()
    }

    pub fn round(&self) -> u32 {
        self.turns.round()
    }

    pub fn outcome(&self) -> Option<FloorOutcome> {
        self.turns.outcome()
    }

    pub fn selected(&self) -> Option<UnitId> {
        self.selection.selected()
    }

    pub fn sequencer_state(&self) -> SequencerState {
        self.sequencer.state()
    }

    /// No unit is moving or waiting on an action.
    pub fn is_idle(&self) -> bool {
        self.battlefield.is_idle()
    }

    /// Routes signals and turn transitions until nothing new happens.
    fn settle(&mut self) {
        let limit = self.battlefield.units().len() * 4 + 16;

        for _ in 0..limit {
            let events = self.battlefield.drain_events();
            let mut progressed = !events.is_empty();

            for event in &events {
                self.route(event);
            }

            if self.turns.phase() == TurnPhase::EnemyTurn {
                for event in self.sequencer.pump(&mut self.battlefield) {
                    self.bus.publish(event);
                }
            }

            if let Some(change) = self.advance_turn() {
                self.on_phase_change(change);
                progressed = true;
            }

            if !progressed && self.battlefield.pending_events().is_empty() {
                return;
            }
        }

        tracing::warn!(target: "runtime::session", limit, "session did not settle");
    }

    fn route(&mut self, event: &BattleEvent) {
        self.bus.publish(event.clone());
        self.sequencer.on_event(&mut self.battlefield, event);
        if let Some(selection) = self.selection.on_event(&mut self.battlefield, event) {
            self.bus.publish(selection);
        }
    }

    fn advance_turn(&mut self) -> Option<PhaseChange> {
        if let Some(change) = self.turns.poll(&mut self.battlefield) {
            return Some(change);
        }
        match self.turns.phase() {
            TurnPhase::PlayerTurn => self.turns.check_player_done(&mut self.battlefield),
            TurnPhase::EnemyTurn if self.sequencer.is_finished() && self.battlefield.is_idle() => {
                self.turns.finish_enemy_turn(&mut self.battlefield)
            }
            _ => None,
        }
    }

    fn on_phase_change(&mut self, change: PhaseChange) {
        self.bus.publish(TurnEvent::PhaseChanged(change));

        match change.to {
            TurnPhase::EnemyTurn => {
                self.selection.clear();
                let started = self.sequencer.begin(&self.battlefield);
                self.bus.publish(started);
            }
            TurnPhase::PlayerTurn => self.sequencer.reset(),
            TurnPhase::GameStop => {
                self.sequencer.reset();
                self.selection.clear();
                if let Some(outcome) = self.turns.outcome() {
                    self.bus.publish(TurnEvent::FloorDecided {
                        outcome,
                        round: change.round,
                    });
                }
            }
        }
    }
}

/// Builder for [`Session`] with flexible configuration.
pub struct SessionBuilder {
    config: SessionConfig,
    layout: Option<FloorLayout>,
    battlefield: Option<Battlefield>,
    strategies: Option<StrategyRegistry>,
}

impl SessionBuilder {
    fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            layout: None,
            battlefield: None,
            strategies: None,
        }
    }

    /// Override session configuration
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Override only the engine tuning
    pub fn tactics(mut self, tactics: TacticsConfig) -> Self {
        self.config.tactics = tactics;
        self
    }

    pub fn auto_complete_actions(mut self, enable: bool) -> Self {
        self.config.auto_complete_actions = enable;
        self
    }

    /// Floor to build the battlefield from
    pub fn layout(mut self, layout: FloorLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Prebuilt battlefield; takes precedence over a layout
    pub fn battlefield(mut self, battlefield: Battlefield) -> Self {
        self.battlefield = Some(battlefield);
        self
    }

    /// Replace the default enemy strategies
    pub fn strategies(mut self, strategies: StrategyRegistry) -> Self {
        self.strategies = Some(strategies);
        self
    }

    pub fn build(self) -> Result<Session> {
        let battlefield = match (self.battlefield, self.layout) {
            (Some(battlefield), _) => battlefield,
            (None, Some(layout)) => Battlefield::from_layout(&layout, self.config.tactics.clone())?,
            (None, None) => return Err(RuntimeError::MissingFloor),
        };
        if battlefield.living(Faction::Ally) == 0 {
            return Err(RuntimeError::NoAllies);
        }

        Ok(Session {
            battlefield,
            turns: TurnController::new(),
            sequencer: EnemyTurnSequencer::new(self.strategies.unwrap_or_default()),
            selection: SelectionOrchestrator::new(),
            bus: EventBus::with_capacity(self.config.event_buffer_size),
            config: self.config,
        })
    }
}
