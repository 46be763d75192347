//! Player input orchestration.
//!
//! The host feeds one selected cell per frame. What that cell means depends
//! on what is already selected and what stands on it; anything that does not
//! make sense silently deselects.

use tactics_core::{
    BattleEvent, Battlefield, Faction, Node, NodeId, Occupancy, Position, TurnController, UnitId,
};

use crate::events::SelectionEvent;

/// Attack waiting on the attacker's move completion signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct QueuedAttack {
    unit: UnitId,
    target: Position,
}

#[derive(Debug, Default)]
pub struct SelectionOrchestrator {
    selected: Option<UnitId>,
    queued: Option<QueuedAttack>,
}

impl SelectionOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<UnitId> {
        self.selected
    }

    pub fn has_queued_attack(&self) -> bool {
        self.queued.is_some()
    }

    /// Drops the selection and any queued attack. Called when the player
    /// turn ends.
    pub fn clear(&mut self) {
        self.selected = None;
        self.queued = None;
    }

    /// Interprets one selected cell.
    pub fn select(
        &mut self,
        battlefield: &mut Battlefield,
        turns: &TurnController,
        position: Position,
    ) -> SelectionEvent {
        if !turns.accepts_player_input() || !battlefield.is_idle() || self.queued.is_some() {
            tracing::debug!(target: "runtime::selection", position = %position, phase = %turns.phase(), "input ignored");
            return SelectionEvent::Ignored { position };
        }

        if let Some(id) = self.selected
            && let Some(unit) = battlefield.unit(id)
            && unit.grid_position() == position
            && !unit.has_moved()
        {
            return self.order_move(battlefield, id, position);
        }

        if let Some(unit) = battlefield.unit_at(position)
            && unit.faction() == Faction::Ally
            && !unit.is_done()
        {
            let id = unit.id();
            return self.select_unit(battlefield, id);
        }

        let Some(id) = self.selected else {
            return self.deselect();
        };
        if !battlefield.refresh_tiles(id) {
            return self.deselect();
        }
        let Some(faction) = battlefield.unit(id).map(|unit| unit.faction()) else {
            return self.deselect();
        };

        match battlefield.grid().occupancy(position) {
            Some(occupancy) if occupancy.is_hostile_to(faction) => {
                self.order_attack(battlefield, id, position)
            }
            Some(Occupancy::Interactable) => self.order_interact(battlefield, id, position),
            Some(Occupancy::Empty) => self.order_move(battlefield, id, position),
            _ => self.deselect(),
        }
    }

    /// Fires a queued attack once its attacker has arrived.
    pub fn on_event(&mut self, battlefield: &mut Battlefield, event: &BattleEvent) -> Option<SelectionEvent> {
        match event {
            BattleEvent::FinishedMoving { unit, .. } => {
                let queued = self.queued.filter(|queued| queued.unit == *unit)?;
                self.queued = None;
                self.selected = None;

                match battlefield.start_attack(queued.unit, queued.target) {
                    Ok(handle) => Some(SelectionEvent::AttackOrdered {
                        unit: queued.unit,
                        target: queued.target,
                        handle,
                    }),
                    Err(error) => {
                        tracing::debug!(target: "runtime::selection", unit = %unit, error = %error, "queued attack dropped");
                        None
                    }
                }
            }
            BattleEvent::UnitDefeated { unit, .. } => {
                if self.selected == Some(*unit) {
                    self.selected = None;
                }
                if self.queued.is_some_and(|queued| queued.unit == *unit) {
                    self.queued = None;
                }
                None
            }
            _ => None,
        }
    }

    fn select_unit(&mut self, battlefield: &mut Battlefield, id: UnitId) -> SelectionEvent {
        battlefield.refresh_tiles(id);
        let Some(unit) = battlefield.unit(id) else {
            return self.deselect();
        };
        let positions = |tiles: &tactics_core::NodeSet| -> Vec<Position> {
            tiles
                .iter()
                .filter_map(|node| battlefield.position_of(*node))
                .collect()
        };
        let move_tiles = if unit.has_moved() {
            Vec::new()
        } else {
            positions(unit.move_tiles())
        };
        let attack_tiles = if unit.has_attacked() {
            Vec::new()
        } else {
            positions(unit.attack_tiles())
        };

        self.selected = Some(id);
        tracing::debug!(target: "runtime::selection", unit = %id, "unit selected");
        SelectionEvent::Selected {
            unit: id,
            move_tiles,
            attack_tiles,
        }
    }

    fn deselect(&mut self) -> SelectionEvent {
        self.selected = None;
        SelectionEvent::Deselected
    }

    fn order_move(&mut self, battlefield: &mut Battlefield, id: UnitId, to: Position) -> SelectionEvent {
        match battlefield.start_move(id, to) {
            Ok(()) => SelectionEvent::MoveOrdered {
                unit: id,
                to,
                then_attack: None,
            },
            Err(error) => {
                tracing::debug!(target: "runtime::selection", unit = %id, error = %error, "move rejected");
                self.deselect()
            }
        }
    }

    /// Attacks from where the unit stands, or walks into range first when it
    /// still has its move.
    fn order_attack(&mut self, battlefield: &mut Battlefield, id: UnitId, target: Position) -> SelectionEvent {
        let Some(target_node) = battlefield.node_id(target) else {
            return self.deselect();
        };
        let Some(unit) = battlefield.unit(id) else {
            return self.deselect();
        };
        if unit.has_attacked() || !unit.attack_tiles().contains(&target_node) {
            return self.deselect();
        }

        let here = unit.grid_position();
        let in_reach = battlefield
            .node_of(id)
            .is_some_and(|origin| {
                battlefield
                    .nodes_within_distance(origin, unit.attack_range())
                    .contains(&target_node)
            });

        if in_reach {
            return match battlefield.start_attack(id, target) {
                Ok(handle) => {
                    self.selected = None;
                    SelectionEvent::AttackOrdered {
                        unit: id,
                        target,
                        handle,
                    }
                }
                Err(error) => {
                    tracing::debug!(target: "runtime::selection", unit = %id, error = %error, "attack rejected");
                    self.deselect()
                }
            };
        }

        if unit.has_moved() {
            return self.deselect();
        }
        let Some(stand) = staging_tile(battlefield, unit.move_tiles(), here, target, unit.attack_range())
        else {
            return self.deselect();
        };

        match battlefield.start_move(id, stand) {
            Ok(()) => {
                self.queued = Some(QueuedAttack { unit: id, target });
                SelectionEvent::MoveOrdered {
                    unit: id,
                    to: stand,
                    then_attack: Some(target),
                }
            }
            Err(error) => {
                tracing::debug!(target: "runtime::selection", unit = %id, error = %error, "approach rejected");
                self.deselect()
            }
        }
    }

    fn order_interact(&mut self, battlefield: &mut Battlefield, id: UnitId, target: Position) -> SelectionEvent {
        match battlefield.start_interact(id, target) {
            Ok(handle) => {
                self.selected = None;
                SelectionEvent::InteractOrdered {
                    unit: id,
                    target,
                    handle,
                }
            }
            Err(error) => {
                tracing::debug!(target: "runtime::selection", unit = %id, error = %error, "interaction rejected");
                self.deselect()
            }
        }
    }
}

/// Closest empty move tile from which `target` is within `range`.
fn staging_tile(
    battlefield: &Battlefield,
    move_tiles: &tactics_core::NodeSet,
    here: Position,
    target: Position,
    range: u32,
) -> Option<Position> {
    move_tiles
        .iter()
        .filter(|node| battlefield.grid().node(**node).is_some_and(Node::is_empty))
        .filter_map(|node: &NodeId| battlefield.position_of(*node))
        .filter(|position| position.manhattan(target) <= range)
        .min_by_key(|position| (position.manhattan(here), *position))
}

#[cfg(test)]
mod tests {
    use tactics_core::{FloorLayout, TacticsConfig, UnitSpawn, UnitStats};

    use super::*;

    const HERO: UnitId = UnitId(1);
    const SIDEKICK: UnitId = UnitId(2);
    const FOE: UnitId = UnitId(10);

    fn setup() -> (Battlefield, TurnController) {
        let layout = FloorLayout::new(Position::new(0, 4), Position::new(6, 0))
            .with_interactables([Position::new(0, 4)])
            .with_unit(UnitSpawn::new(HERO, Faction::Ally, Position::new(0, 0)))
            .with_unit(UnitSpawn::new(SIDEKICK, Faction::Ally, Position::new(0, 3)))
            .with_unit(
                UnitSpawn::new(FOE, Faction::Enemy, Position::new(4, 0))
                    .with_stats(UnitStats::new(3, 1, 3, 1)),
            );
        let mut battlefield = Battlefield::from_layout(&layout, TacticsConfig::default()).unwrap();
        let mut turns = TurnController::new();
        turns.start_player_turn(&mut battlefield);
        (battlefield, turns)
    }

    fn settle(battlefield: &mut Battlefield, selection: &mut SelectionOrchestrator) -> Vec<SelectionEvent> {
        let mut published = Vec::new();
        for _ in 0..500 {
            battlefield.advance(0.05);
            for event in battlefield.drain_events() {
                published.extend(selection.on_event(battlefield, &event));
            }
            if battlefield.units().iter().all(|unit| !unit.is_moving()) {
                break;
            }
        }
        published
    }

    #[test]
    fn selecting_an_ally_shows_its_tiles() {
        let (mut battlefield, turns) = setup();
        let mut selection = SelectionOrchestrator::new();

        let event = selection.select(&mut battlefield, &turns, Position::new(0, 0));

        let SelectionEvent::Selected {
            unit,
            move_tiles,
            attack_tiles,
        } = event
        else {
            panic!("expected a selection, got {event:?}");
        };
        assert_eq!(unit, HERO);
        assert!(move_tiles.contains(&Position::new(3, 0)));
        assert!(!move_tiles.contains(&Position::new(4, 0)));
        assert!(attack_tiles.contains(&Position::new(4, 0)));
        assert_eq!(selection.selected(), Some(HERO));
    }

    #[test]
    fn nothing_selected_means_deselect() {
        let (mut battlefield, turns) = setup();
        let mut selection = SelectionOrchestrator::new();

        assert_eq!(
            selection.select(&mut battlefield, &turns, Position::new(2, 2)),
            SelectionEvent::Deselected
        );
    }

    #[test]
    fn empty_move_tile_moves_the_selected_unit() {
        let (mut battlefield, turns) = setup();
        let mut selection = SelectionOrchestrator::new();
        selection.select(&mut battlefield, &turns, Position::new(0, 0));

        let event = selection.select(&mut battlefield, &turns, Position::new(1, 1));

        assert_eq!(
            event,
            SelectionEvent::MoveOrdered {
                unit: HERO,
                to: Position::new(1, 1),
                then_attack: None,
            }
        );
        assert_eq!(
            selection.select(&mut battlefield, &turns, Position::new(2, 2)),
            SelectionEvent::Ignored {
                position: Position::new(2, 2)
            }
        );
        settle(&mut battlefield, &mut selection);
        assert_eq!(
            battlefield.unit(HERO).unwrap().grid_position(),
            Position::new(1, 1)
        );
    }

    #[test]
    fn distant_hostile_queues_attack_behind_the_move() {
        let (mut battlefield, turns) = setup();
        let mut selection = SelectionOrchestrator::new();
        selection.select(&mut battlefield, &turns, Position::new(0, 0));

        let event = selection.select(&mut battlefield, &turns, Position::new(4, 0));
        assert_eq!(
            event,
            SelectionEvent::MoveOrdered {
                unit: HERO,
                to: Position::new(3, 0),
                then_attack: Some(Position::new(4, 0)),
            }
        );
        assert!(selection.has_queued_attack());
        assert!(!battlefield.unit(HERO).unwrap().has_attacked());

        let published = settle(&mut battlefield, &mut selection);

        assert!(matches!(
            published.as_slice(),
            [SelectionEvent::AttackOrdered { unit: HERO, .. }]
        ));
        assert!(battlefield.unit(HERO).unwrap().has_attacked());
        assert!(!selection.has_queued_attack());
    }

    #[test]
    fn reselecting_the_unit_stays_put() {
        let (mut battlefield, turns) = setup();
        let mut selection = SelectionOrchestrator::new();
        selection.select(&mut battlefield, &turns, Position::new(0, 0));

        selection.select(&mut battlefield, &turns, Position::new(0, 0));

        let hero = battlefield.unit(HERO).unwrap();
        assert!(hero.has_moved());
        assert_eq!(hero.grid_position(), Position::ORIGIN);
    }

    #[test]
    fn adjacent_interactable_is_used() {
        let (mut battlefield, turns) = setup();
        let mut selection = SelectionOrchestrator::new();
        selection.select(&mut battlefield, &turns, Position::new(0, 3));

        let event = selection.select(&mut battlefield, &turns, Position::new(0, 4));

        assert!(matches!(
            event,
            SelectionEvent::InteractOrdered { unit: SIDEKICK, .. }
        ));
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn input_outside_player_turn_is_ignored() {
        let (mut battlefield, mut turns) = setup();
        turns.end_player_turn(&mut battlefield);
        let mut selection = SelectionOrchestrator::new();

        assert_eq!(
            selection.select(&mut battlefield, &turns, Position::new(0, 0)),
            SelectionEvent::Ignored {
                position: Position::new(0, 0)
            }
        );
    }
}
