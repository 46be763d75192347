use std::cmp::Reverse;

use tactics_core::{ActionHandle, Battlefield, Position, UnitId};

use super::EnemyStrategy;
use super::strategy::{approaches, hostile_in_reach, step_toward, strike};

/// Keeps its distance.
///
/// Same targeting as [`MeleeStrategy`](super::MeleeStrategy), but among the
/// reachable attack positions it prefers those farthest from the target, and
/// only then the cheapest path. With no long-range position reachable it
/// settles for a closer one.
#[derive(Clone, Copy, Debug, Default)]
pub struct RangedStrategy;

impl EnemyStrategy for RangedStrategy {
    fn name(&self) -> &'static str {
        "ranged"
    }

    fn find_tile_to_move_to(&self, battlefield: &mut Battlefield, unit: UnitId) -> Option<Position> {
        battlefield.refresh_tiles(unit);
        if hostile_in_reach(battlefield, battlefield.unit(unit)?).is_some() {
            return None;
        }

        let best = approaches(battlefield, unit)
            .into_iter()
            .min_by_key(|approach| (Reverse(approach.standoff), approach.cost))?;
        tracing::debug!(
            target: "runtime::ai",
            unit = %unit,
            target_unit = %best.target,
            standoff = best.standoff,
            "taking position"
        );
        step_toward(battlefield, unit, best.node)
    }

    fn attempt_action(&self, battlefield: &mut Battlefield, unit: UnitId) -> Option<ActionHandle> {
        battlefield.refresh_tiles(unit);
        let (_, target) = hostile_in_reach(battlefield, battlefield.unit(unit)?)?;
        strike(battlefield, unit, target)
    }
}
