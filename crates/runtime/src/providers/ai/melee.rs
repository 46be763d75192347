use tactics_core::{ActionHandle, Battlefield, Position, UnitId};

use super::EnemyStrategy;
use super::strategy::{approaches, hostile_in_reach, step_toward, strike};

/// Default enemy policy.
///
/// Strikes a hostile already within reach of its current node without moving.
/// Otherwise picks the hostile inside the aggro radius whose nearest empty
/// attack position has the lowest path cost and walks toward that position
/// as far as its move range allows.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeleeStrategy;

impl EnemyStrategy for MeleeStrategy {
    fn name(&self) -> &'static str {
        "melee"
    }

    fn find_tile_to_move_to(&self, battlefield: &mut Battlefield, unit: UnitId) -> Option<Position> {
        battlefield.refresh_tiles(unit);
        if hostile_in_reach(battlefield, battlefield.unit(unit)?).is_some() {
            return None;
        }

        let best = approaches(battlefield, unit)
            .into_iter()
            .min_by_key(|approach| approach.cost)?;
        tracing::debug!(
            target: "runtime::ai",
            unit = %unit,
            target_unit = %best.target,
            cost = best.cost,
            "closing in"
        );
        step_toward(battlefield, unit, best.node)
    }

    fn attempt_action(&self, battlefield: &mut Battlefield, unit: UnitId) -> Option<ActionHandle> {
        battlefield.refresh_tiles(unit);
        let (_, target) = hostile_in_reach(battlefield, battlefield.unit(unit)?)?;
        strike(battlefield, unit, target)
    }
}

#[cfg(test)]
mod tests {
    use tactics_core::{BehaviorKind, Faction, TacticsConfig, UnitSpawn, UnitStats};

    use super::*;
    use crate::providers::ai::testing::{GRUNT, HERO, build, duel};

    fn corridor() -> tactics_core::FloorLayout {
        duel(
            7,
            1,
            Position::new(0, 0),
            Position::new(6, 0),
            UnitStats::new(10, 3, 3, 1),
            BehaviorKind::Melee,
        )
    }

    #[test]
    fn closes_in_by_move_range() {
        let mut battlefield = build(&corridor());

        let tile = MeleeStrategy.find_tile_to_move_to(&mut battlefield, GRUNT);

        assert_eq!(tile, Some(Position::new(3, 0)));
    }

    #[test]
    fn backs_off_when_the_landing_cell_is_taken() {
        let layout = corridor().with_unit(UnitSpawn::new(
            tactics_core::UnitId(11),
            Faction::Enemy,
            Position::new(3, 0),
        ));
        let mut battlefield = build(&layout);

        let tile = MeleeStrategy.find_tile_to_move_to(&mut battlefield, GRUNT);

        assert_eq!(tile, Some(Position::new(4, 0)));
    }

    #[test]
    fn attacks_without_moving_when_in_reach() {
        let layout = duel(
            3,
            1,
            Position::new(0, 0),
            Position::new(1, 0),
            UnitStats::default(),
            BehaviorKind::Melee,
        );
        let mut battlefield = build(&layout);

        assert_eq!(MeleeStrategy.find_tile_to_move_to(&mut battlefield, GRUNT), None);

        let handle = MeleeStrategy
            .attempt_action(&mut battlefield, GRUNT)
            .unwrap();
        battlefield.complete_action(handle);
        assert_eq!(battlefield.unit(HERO).unwrap().health(), 7);
    }

    #[test]
    fn ignores_hostiles_beyond_aggro_radius() {
        let layout = corridor();
        let config = TacticsConfig::default().with_aggro_radius(2);
        let mut battlefield = tactics_core::Battlefield::from_layout(&layout, config).unwrap();

        assert_eq!(MeleeStrategy.find_tile_to_move_to(&mut battlefield, GRUNT), None);
        assert_eq!(MeleeStrategy.attempt_action(&mut battlefield, GRUNT), None);
    }

    #[test]
    fn walled_off_hostile_is_ignored() {
        let layout = duel(
            5,
            1,
            Position::new(0, 0),
            Position::new(4, 0),
            UnitStats::default(),
            BehaviorKind::Melee,
        )
        .with_walls([Position::new(2, 0)]);
        let mut battlefield = build(&layout);

        assert_eq!(MeleeStrategy.find_tile_to_move_to(&mut battlefield, GRUNT), None);
    }
}
