//! Enemy decision policy abstraction and the queries the policies share.

use std::collections::HashMap;
use std::sync::Arc;

use tactics_core::{ActionHandle, Battlefield, BehaviorKind, Node, NodeId, Position, Unit, UnitId};

use super::{DefendTileStrategy, MeleeStrategy, RangedStrategy};

/// Per-unit enemy policy driven by the turn sequencer.
///
/// Both calls receive the live battlefield and must recompute whatever tile
/// caches they read. Returning `None` is a normal answer: "stay put" from
/// [`find_tile_to_move_to`](Self::find_tile_to_move_to), "nothing to do" from
/// [`attempt_action`](Self::attempt_action).
pub trait EnemyStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cell to walk to this turn, if any.
    fn find_tile_to_move_to(&self, battlefield: &mut Battlefield, unit: UnitId) -> Option<Position>;

    /// Starts an attack or interaction once movement has settled.
    fn attempt_action(&self, battlefield: &mut Battlefield, unit: UnitId) -> Option<ActionHandle>;
}

/// Maps behaviour tags to policies.
#[derive(Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<BehaviorKind, Arc<dyn EnemyStrategy>>,
}

impl StrategyRegistry {
    /// An empty registry. Most callers want [`StrategyRegistry::default`].
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Registers or replaces the policy for `kind`.
    pub fn register(&mut self, kind: BehaviorKind, strategy: impl EnemyStrategy + 'static) {
        self.strategies.insert(kind, Arc::new(strategy));
    }

    #[must_use]
    pub fn with(mut self, kind: BehaviorKind, strategy: impl EnemyStrategy + 'static) -> Self {
        self.register(kind, strategy);
        self
    }

    pub fn get(&self, kind: BehaviorKind) -> Option<Arc<dyn EnemyStrategy>> {
        self.strategies.get(&kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::empty()
            .with(BehaviorKind::Melee, MeleeStrategy)
            .with(BehaviorKind::Ranged, RangedStrategy)
            .with(BehaviorKind::DefendTile, DefendTileStrategy)
    }
}

/// A reachable empty cell from which `target` is within attack range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Approach {
    pub target: UnitId,
    pub node: NodeId,
    /// Path cost (F of the unit's node) to reach `node`.
    pub cost: i32,
    /// Manhattan distance between `node` and the target.
    pub standoff: u32,
}

/// Weakest living hostile within attack range of the unit's current node.
pub(crate) fn hostile_in_reach(battlefield: &Battlefield, unit: &Unit) -> Option<(UnitId, Position)> {
    let origin = battlefield.node_of(unit.id())?;
    battlefield
        .nodes_within_distance(origin, unit.attack_range())
        .into_iter()
        .filter_map(|node| battlefield.occupant_at(node))
        .filter_map(|id| battlefield.unit(id))
        .filter(|target| target.faction() != unit.faction() && target.is_alive())
        .min_by_key(|target| (target.health(), target.id()))
        .map(|target| (target.id(), target.grid_position()))
}

/// Every attack position the unit can path to, across all hostiles inside
/// the aggro radius.
pub(crate) fn approaches(battlefield: &mut Battlefield, id: UnitId) -> Vec<Approach> {
    let Some(unit) = battlefield.unit(id) else {
        return Vec::new();
    };
    let faction = unit.faction();
    let range = unit.attack_range();
    let here = unit.grid_position();
    let aggro = battlefield.config().aggro_radius;
    let Some(start) = battlefield.node_of(id) else {
        return Vec::new();
    };

    let targets: Vec<(UnitId, Position)> = battlefield
        .units()
        .of_faction(faction.opponent())
        .filter(|target| target.is_alive() && target.grid_position().manhattan(here) <= aggro)
        .map(|target| (target.id(), target.grid_position()))
        .collect();

    let mut found = Vec::new();
    for (target, at) in targets {
        let Some(target_node) = battlefield.node_id(at) else {
            continue;
        };
        for node in battlefield.nodes_within_distance(target_node, range) {
            let open = battlefield.grid().node(node).is_some_and(Node::is_empty);
            if !open {
                continue;
            }
            let Ok(summary) = battlefield.try_pathing(Some(start), Some(node), faction, true) else {
                continue;
            };
            let standoff = battlefield
                .position_of(node)
                .map_or(0, |position| position.manhattan(at));
            found.push(Approach {
                target,
                node,
                cost: summary.cost,
                standoff,
            });
        }
    }

    tracing::trace!(target: "runtime::ai", unit = %id, candidates = found.len(), "approaches scored");
    found
}

/// Walks the route toward `goal` as far as the move range allows, backing off
/// one hop at a time while the landing cell is not a move tile.
pub(crate) fn step_toward(battlefield: &mut Battlefield, id: UnitId, goal: NodeId) -> Option<Position> {
    let unit = battlefield.unit(id)?;
    let faction = unit.faction();
    let budget = unit.move_range() as usize;
    let start = battlefield.node_of(id)?;

    if !battlefield.pathing(Some(start), Some(goal), faction, true) {
        return None;
    }
    let route = battlefield.grid().route_from(start)?;
    let tiles = battlefield.calc_move_tiles(id)?.clone();

    let hops = route.len().min(budget);
    route[..hops]
        .iter()
        .rev()
        .find(|node| tiles.contains(*node))
        .and_then(|node| battlefield.position_of(*node))
}

/// Starts an attack, logging a rejection instead of surfacing it.
pub(crate) fn strike(battlefield: &mut Battlefield, id: UnitId, target: Position) -> Option<ActionHandle> {
    match battlefield.start_attack(id, target) {
        Ok(handle) => Some(handle),
        Err(error) => {
            tracing::debug!(target: "runtime::ai", unit = %id, error = %error, "attack rejected");
            None
        }
    }
}
