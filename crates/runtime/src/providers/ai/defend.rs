use tactics_core::{ActionHandle, Battlefield, Position, UnitId};

use super::EnemyStrategy;
use super::strategy::{hostile_in_reach, strike};

/// Holds its tile for the whole floor.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefendTileStrategy;

impl EnemyStrategy for DefendTileStrategy {
    fn name(&self) -> &'static str {
        "defend_tile"
    }

    fn find_tile_to_move_to(&self, _battlefield: &mut Battlefield, _unit: UnitId) -> Option<Position> {
        None
    }

    fn attempt_action(&self, battlefield: &mut Battlefield, unit: UnitId) -> Option<ActionHandle> {
        battlefield.refresh_tiles(unit);
        let (_, target) = hostile_in_reach(battlefield, battlefield.unit(unit)?)?;
        strike(battlefield, unit, target)
    }
}
