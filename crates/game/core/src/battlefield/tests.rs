use super::*;
use crate::unit::BehaviorKind;

const ALLY: UnitId = UnitId(1);
const ENEMY: UnitId = UnitId(2);

fn layout(width: i32, height: i32) -> FloorLayout {
    FloorLayout::new(Position::new(0, height - 1), Position::new(width - 1, 0))
}

fn spawn(id: UnitId, faction: Faction, x: i32, y: i32) -> UnitSpawn {
    UnitSpawn::new(id, faction, Position::new(x, y))
}

/// Ticks until the battlefield settles or the budget runs out.
fn run_until_idle(battlefield: &mut Battlefield) {
    for _ in 0..1_000 {
        if battlefield.is_idle() {
            return;
        }
        battlefield.advance(0.05);
    }
    panic!("battlefield never settled");
}

#[test]
fn layout_marks_walls_and_units() {
    let floor = layout(4, 4)
        .with_walls([Position::new(1, 1)])
        .with_interactables([Position::new(3, 3)])
        .with_unit(spawn(ALLY, Faction::Ally, 0, 0))
        .with_unit(spawn(ENEMY, Faction::Enemy, 2, 2));

    let battlefield = Battlefield::from_layout(&floor, TacticsConfig::default()).unwrap();

    let grid = battlefield.grid();
    assert_eq!(grid.occupancy(Position::new(1, 1)), Some(Occupancy::Wall));
    assert_eq!(grid.occupancy(Position::new(3, 3)), Some(Occupancy::Interactable));
    assert_eq!(grid.occupancy(Position::new(0, 0)), Some(Occupancy::Ally));
    assert_eq!(grid.occupancy(Position::new(2, 2)), Some(Occupancy::Enemy));
    assert!(!battlefield.unit(ALLY).unwrap().move_tiles().is_empty());
}

#[test]
fn layout_rejects_bad_spawns() {
    let off_grid = layout(2, 2).with_unit(spawn(ALLY, Faction::Ally, 5, 5));
    assert_eq!(
        Battlefield::from_layout(&off_grid, TacticsConfig::default()).err(),
        Some(FloorError::OutOfBounds {
            position: Position::new(5, 5)
        })
    );

    let on_wall = layout(2, 2)
        .with_walls([Position::ORIGIN])
        .with_unit(spawn(ALLY, Faction::Ally, 0, 0));
    assert!(matches!(
        Battlefield::from_layout(&on_wall, TacticsConfig::default()),
        Err(FloorError::CellTaken { .. })
    ));

    let twice = layout(2, 2)
        .with_unit(spawn(ALLY, Faction::Ally, 0, 0))
        .with_unit(spawn(ALLY, Faction::Ally, 1, 1));
    assert_eq!(
        Battlefield::from_layout(&twice, TacticsConfig::default()).err(),
        Some(FloorError::DuplicateUnit { id: ALLY })
    );
}

#[test]
fn bounds_spanning_the_coordinate_range_are_too_large() {
    let floor = FloorLayout::new(Position::new(i32::MIN, 0), Position::new(i32::MAX, 0))
        .with_unit(spawn(ALLY, Faction::Ally, 0, 0));

    assert!(matches!(
        Battlefield::from_layout(&floor, TacticsConfig::default()),
        Err(FloorError::TooLarge { .. })
    ));
}

#[test]
fn occupant_lookup_scans_roster() {
    let floor = layout(3, 3).with_unit(spawn(ALLY, Faction::Ally, 1, 2));
    let battlefield = Battlefield::from_layout(&floor, TacticsConfig::default()).unwrap();

    let node = battlefield.node_id(Position::new(1, 2)).unwrap();
    assert_eq!(battlefield.occupant_at(node), Some(ALLY));
    let empty = battlefield.node_id(Position::ORIGIN).unwrap();
    assert_eq!(battlefield.occupant_at(empty), None);
}

#[test]
fn tile_caches_are_stable_without_mutation() {
    let floor = layout(6, 6)
        .with_walls([Position::new(2, 2)])
        .with_unit(spawn(ALLY, Faction::Ally, 1, 1))
        .with_unit(spawn(ENEMY, Faction::Enemy, 4, 4));
    let mut battlefield = Battlefield::from_layout(&floor, TacticsConfig::default()).unwrap();

    let first_move = battlefield.calc_move_tiles(ALLY).cloned().unwrap();
    let first_attack = battlefield.calc_attack_tiles(ALLY).cloned().unwrap();
    let second_move = battlefield.calc_move_tiles(ALLY).cloned().unwrap();
    let second_attack = battlefield.calc_attack_tiles(ALLY).cloned().unwrap();

    assert_eq!(first_move, second_move);
    assert_eq!(first_attack, second_attack);
}

#[test]
fn raising_move_range_recomputes_tiles() {
    let floor = layout(9, 9).with_unit(
        spawn(ALLY, Faction::Ally, 4, 4).with_stats(UnitStats::new(10, 3, 1, 1)),
    );
    let mut battlefield = Battlefield::from_layout(&floor, TacticsConfig::default()).unwrap();
    assert_eq!(battlefield.unit(ALLY).unwrap().move_tiles().len(), 5);

    assert!(battlefield.set_move_range(ALLY, 2));

    let unit = battlefield.unit(ALLY).unwrap();
    assert_eq!(unit.move_range(), 2);
    assert_eq!(unit.move_tiles().len(), 13);
}

#[test]
fn move_walks_route_and_spends_range() {
    let floor = layout(5, 5).with_unit(spawn(ALLY, Faction::Ally, 0, 0));
    let mut battlefield = Battlefield::from_layout(&floor, TacticsConfig::default()).unwrap();

    battlefield.start_move(ALLY, Position::new(2, 1)).unwrap();
    assert!(battlefield.unit(ALLY).unwrap().is_moving());
    run_until_idle(&mut battlefield);

    let unit = battlefield.unit(ALLY).unwrap();
    assert_eq!(unit.grid_position(), Position::new(2, 1));
    assert!(unit.has_moved());
    assert_eq!(unit.move_range(), 0);
    assert_eq!(
        battlefield.grid().occupancy(Position::ORIGIN),
        Some(Occupancy::Empty)
    );
    assert_eq!(
        battlefield.grid().occupancy(Position::new(2, 1)),
        Some(Occupancy::Ally)
    );

    let events = battlefield.drain_events();
    assert!(matches!(events.first(), Some(BattleEvent::MoveStarted { .. })));
    assert_eq!(
        events.last(),
        Some(&BattleEvent::FinishedMoving {
            unit: ALLY,
            at: Position::new(2, 1)
        })
    );
}

#[test]
fn partial_tick_leaves_unit_between_cells() {
    let floor = layout(3, 1).with_unit(spawn(ALLY, Faction::Ally, 0, 0));
    let config = TacticsConfig::default().with_move_speed(1.0);
    let mut battlefield = Battlefield::from_layout(&floor, config).unwrap();

    battlefield.start_move(ALLY, Position::new(2, 0)).unwrap();
    battlefield.advance(0.5);

    let unit = battlefield.unit(ALLY).unwrap();
    assert!(unit.is_moving());
    assert!((unit.world_position().x - 0.5).abs() < 1e-4);
    assert!(!battlefield
        .pending_events()
        .iter()
        .any(BattleEvent::is_completion));
}

#[test]
fn passing_through_an_ally_keeps_its_cell() {
    let other = UnitId(3);
    let floor = layout(3, 1)
        .with_unit(spawn(ALLY, Faction::Ally, 0, 0))
        .with_unit(spawn(other, Faction::Ally, 1, 0));
    let mut battlefield = Battlefield::from_layout(&floor, TacticsConfig::default()).unwrap();

    battlefield.start_move(ALLY, Position::new(2, 0)).unwrap();
    run_until_idle(&mut battlefield);

    let grid = battlefield.grid();
    assert_eq!(grid.occupancy(Position::new(0, 0)), Some(Occupancy::Empty));
    assert_eq!(grid.occupancy(Position::new(1, 0)), Some(Occupancy::Ally));
    assert_eq!(grid.occupancy(Position::new(2, 0)), Some(Occupancy::Ally));
}

#[test]
fn move_is_rejected_outside_move_tiles_and_after_moving() {
    let floor = layout(6, 1).with_unit(
        spawn(ALLY, Faction::Ally, 0, 0).with_stats(UnitStats::new(10, 3, 2, 1)),
    );
    let mut battlefield = Battlefield::from_layout(&floor, TacticsConfig::default()).unwrap();

    assert!(matches!(
        battlefield.start_move(ALLY, Position::new(4, 0)),
        Err(MoveError::OutOfReach { .. })
    ));

    battlefield.start_move(ALLY, Position::new(1, 0)).unwrap();
    assert_eq!(
        battlefield.start_move(ALLY, Position::new(2, 0)),
        Err(MoveError::Busy(ALLY))
    );
    run_until_idle(&mut battlefield);
    assert_eq!(
        battlefield.start_move(ALLY, Position::new(2, 0)),
        Err(MoveError::AlreadyMoved(ALLY))
    );
}

#[test]
fn staying_put_settles_immediately() {
    let floor = layout(3, 3).with_unit(spawn(ALLY, Faction::Ally, 1, 1));
    let mut battlefield = Battlefield::from_layout(&floor, TacticsConfig::default()).unwrap();

    battlefield.start_move(ALLY, Position::new(1, 1)).unwrap();

    let unit = battlefield.unit(ALLY).unwrap();
    assert!(unit.has_moved());
    assert!(!unit.is_moving());
    assert_eq!(
        battlefield.drain_events(),
        vec![BattleEvent::FinishedMoving {
            unit: ALLY,
            at: Position::new(1, 1)
        }]
    );
}

#[test]
fn attack_resolves_against_current_occupant() {
    let floor = layout(3, 1)
        .with_unit(spawn(ALLY, Faction::Ally, 0, 0))
        .with_unit(spawn(ENEMY, Faction::Enemy, 1, 0));
    let mut battlefield = Battlefield::from_layout(&floor, TacticsConfig::default()).unwrap();

    let handle = battlefield.start_attack(ALLY, Position::new(1, 0)).unwrap();
    assert!(battlefield.unit(ALLY).unwrap().has_attacked());
    assert!(!battlefield.is_idle());

    assert!(battlefield.complete_action(handle));

    assert_eq!(battlefield.unit(ENEMY).unwrap().health(), 7);
    let events = battlefield.drain_events();
    assert!(events.contains(&BattleEvent::AttackResolved {
        attacker: ALLY,
        target: Some(ENEMY),
        damage: 3,
    }));
    assert_eq!(events.last(), Some(&BattleEvent::FinishedAction { unit: ALLY }));
    assert!(battlefield.is_idle());
}

#[test]
fn attack_on_vanished_target_is_a_silent_no_op() {
    let floor = layout(3, 1)
        .with_unit(spawn(ALLY, Faction::Ally, 0, 0))
        .with_unit(spawn(ENEMY, Faction::Enemy, 1, 0));
    let mut battlefield = Battlefield::from_layout(&floor, TacticsConfig::default()).unwrap();

    battlefield.start_attack(ALLY, Position::new(1, 0)).unwrap();
    battlefield.remove_unit(ENEMY);
    battlefield.drain_events();

    assert!(battlefield.end_attack(ALLY));

    assert_eq!(
        battlefield.drain_events(),
        vec![
            BattleEvent::AttackResolved {
                attacker: ALLY,
                target: None,
                damage: 0,
            },
            BattleEvent::FinishedAction { unit: ALLY },
        ]
    );
}

#[test]
fn lethal_attack_removes_target_and_frees_cell() {
    let floor = layout(3, 1)
        .with_unit(
            spawn(ALLY, Faction::Ally, 0, 0).with_stats(UnitStats::new(10, 20, 3, 1)),
        )
        .with_unit(spawn(ENEMY, Faction::Enemy, 1, 0).with_behavior(BehaviorKind::DefendTile));
    let mut battlefield = Battlefield::from_layout(&floor, TacticsConfig::default()).unwrap();

    let handle = battlefield.start_attack(ALLY, Position::new(1, 0)).unwrap();
    battlefield.complete_action(handle);

    assert!(battlefield.unit(ENEMY).is_none());
    assert_eq!(battlefield.living(Faction::Enemy), 0);
    assert_eq!(
        battlefield.grid().occupancy(Position::new(1, 0)),
        Some(Occupancy::Empty)
    );
    assert!(battlefield.drain_events().contains(&BattleEvent::UnitDefeated {
        unit: ENEMY,
        faction: Faction::Enemy,
        at: Position::new(1, 0),
    }));
}

#[test]
fn removing_a_moving_unit_frees_its_cells_and_signals_first() {
    let floor = layout(6, 1).with_unit(spawn(ALLY, Faction::Ally, 0, 0));
    let mut battlefield = Battlefield::from_layout(&floor, TacticsConfig::default()).unwrap();

    battlefield.start_move(ALLY, Position::new(3, 0)).unwrap();
    battlefield.advance(0.25);
    assert!(battlefield.unit(ALLY).unwrap().is_moving());
    battlefield.drain_events();

    battlefield.remove_unit(ALLY);

    assert!(battlefield.grid().nodes().all(|(_, node)| node.is_empty()));
    let events = battlefield.drain_events();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        events[0],
        BattleEvent::FinishedMoving { unit: ALLY, .. }
    ));
    assert!(matches!(
        events[1],
        BattleEvent::UnitDefeated {
            unit: ALLY,
            faction: Faction::Ally,
            ..
        }
    ));
    assert!(battlefield.is_idle());
}

#[test]
fn removing_an_acting_unit_finishes_its_action() {
    let floor = layout(3, 1)
        .with_unit(spawn(ALLY, Faction::Ally, 0, 0))
        .with_unit(spawn(ENEMY, Faction::Enemy, 1, 0));
    let mut battlefield = Battlefield::from_layout(&floor, TacticsConfig::default()).unwrap();

    let handle = battlefield.start_attack(ALLY, Position::new(1, 0)).unwrap();
    battlefield.drain_events();

    battlefield.remove_unit(ALLY);

    assert_eq!(
        battlefield.drain_events(),
        vec![
            BattleEvent::FinishedAction { unit: ALLY },
            BattleEvent::UnitDefeated {
                unit: ALLY,
                faction: Faction::Ally,
                at: Position::ORIGIN,
            },
        ]
    );
    assert_eq!(
        battlefield.grid().occupancy(Position::ORIGIN),
        Some(Occupancy::Empty)
    );
    assert!(!battlefield.complete_action(handle));
    assert_eq!(battlefield.unit(ENEMY).unwrap().health(), 10);
}

#[test]
fn attack_out_of_range_is_rejected() {
    let floor = layout(4, 1)
        .with_unit(spawn(ALLY, Faction::Ally, 0, 0))
        .with_unit(spawn(ENEMY, Faction::Enemy, 3, 0));
    let mut battlefield = Battlefield::from_layout(&floor, TacticsConfig::default()).unwrap();

    assert_eq!(
        battlefield.start_attack(ALLY, Position::new(3, 0)),
        Err(ActionError::OutOfRange {
            unit: ALLY,
            target: Position::new(3, 0)
        })
    );
    assert!(!battlefield.unit(ALLY).unwrap().has_attacked());
}

#[test]
fn stale_handle_is_ignored() {
    let floor = layout(3, 1)
        .with_unit(spawn(ALLY, Faction::Ally, 0, 0))
        .with_unit(spawn(ENEMY, Faction::Enemy, 1, 0));
    let mut battlefield = Battlefield::from_layout(&floor, TacticsConfig::default()).unwrap();

    let handle = battlefield.start_attack(ALLY, Position::new(1, 0)).unwrap();
    assert!(battlefield.complete_action(handle));
    assert!(!battlefield.complete_action(handle));
}

#[test]
fn interaction_needs_adjacent_interactable() {
    let floor = layout(3, 1)
        .with_interactables([Position::new(1, 0)])
        .with_unit(spawn(ALLY, Faction::Ally, 0, 0));
    let mut battlefield = Battlefield::from_layout(&floor, TacticsConfig::default()).unwrap();

    assert!(matches!(
        battlefield.start_interact(ALLY, Position::new(2, 0)),
        Err(ActionError::NotInteractable { .. })
    ));

    let handle = battlefield.start_interact(ALLY, Position::new(1, 0)).unwrap();
    battlefield.complete_action(handle);

    let events = battlefield.drain_events();
    assert!(events.contains(&BattleEvent::Interacted {
        unit: ALLY,
        at: Position::new(1, 0)
    }));
    assert!(battlefield.unit(ALLY).unwrap().has_attacked());
}

#[test]
fn reset_turn_restores_flags_and_range() {
    let floor = layout(4, 1).with_unit(spawn(ALLY, Faction::Ally, 0, 0));
    let mut battlefield = Battlefield::from_layout(&floor, TacticsConfig::default()).unwrap();
    battlefield.start_move(ALLY, Position::new(1, 0)).unwrap();
    run_until_idle(&mut battlefield);

    assert!(battlefield.reset_turn(ALLY));

    let unit = battlefield.unit(ALLY).unwrap();
    assert!(!unit.has_moved());
    assert!(!unit.has_attacked());
    assert_eq!(unit.move_range(), unit.stats().move_range);
    assert_eq!(unit.move_tiles().len(), 4);
}
