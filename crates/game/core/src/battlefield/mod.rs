//! Grid controller for one floor.
//!
//! [`Battlefield`] owns the lattice and the unit roster, answers lookups and
//! reachability queries, and is the only place where occupancy changes. Unit
//! commands live in [`movement`] and [`action`]; both report completion through
//! [`BattleEvent`]s collected here until the host drains them.
mod action;
mod movement;

pub use action::ActionError;
pub use movement::MoveError;

use crate::config::TacticsConfig;
use crate::event::BattleEvent;
use crate::floor::{FloorError, FloorLayout, UnitSpawn};
use crate::grid::{
    Faction, Grid, GridBounds, Node, NodeId, NodeSet, Occupancy, PathError, PathQuery,
    PathSummary, Position, WorldPos,
};
use crate::unit::{ActionHandle, Motion, Unit, UnitId, UnitRoster, UnitStats};

pub struct Battlefield {
    grid: Grid,
    units: UnitRoster,
    config: TacticsConfig,
    next_serial: u64,
    events: Vec<BattleEvent>,
}

impl Battlefield {
    /// Creates an empty floor covering `bounds`.
    pub fn new(bounds: GridBounds, config: TacticsConfig) -> Result<Self, FloorError> {
        let cells = bounds.cell_count();
        if cells > TacticsConfig::MAX_GRID_CELLS {
            return Err(FloorError::TooLarge {
                cells,
                max: TacticsConfig::MAX_GRID_CELLS,
            });
        }

        Ok(Self {
            grid: Grid::new(bounds),
            units: UnitRoster::new(),
            config,
            next_serial: 0,
            events: Vec::new(),
        })
    }

    /// Builds a floor from the generator's hand-over and primes every unit's
    /// tile caches.
    pub fn from_layout(layout: &FloorLayout, config: TacticsConfig) -> Result<Self, FloorError> {
        let bounds = GridBounds::from_corners(layout.top_left, layout.bot_right);
        let mut battlefield = Self::new(bounds, config)?;

        for &wall in &layout.walls {
            battlefield.place(wall, Occupancy::Wall)?;
        }
        for &cell in &layout.interactables {
            battlefield.place(cell, Occupancy::Interactable)?;
        }
        for spawn in &layout.units {
            battlefield.spawn(spawn)?;
        }

        tracing::debug!(
            target: "tactics::grid",
            width = bounds.width(),
            height = bounds.height(),
            walls = layout.walls.len(),
            units = layout.units.len(),
            "floor loaded"
        );

        Ok(battlefield)
    }

    /// Marks a static blocker (wall or interactable) on an empty cell.
    pub fn place(&mut self, position: Position, occupancy: Occupancy) -> Result<(), FloorError> {
        let node = self
            .grid
            .node_at(position)
            .ok_or(FloorError::OutOfBounds { position })?;
        if !node.is_empty() {
            return Err(FloorError::CellTaken {
                position,
                occupant: node.occupying(),
            });
        }
        self.grid.set_occupancy(position, occupancy);
        Ok(())
    }

    pub fn spawn(&mut self, spawn: &UnitSpawn) -> Result<UnitId, FloorError> {
        let node = self.grid.node_at(spawn.position).ok_or(FloorError::OutOfBounds {
            position: spawn.position,
        })?;
        if !node.is_empty() {
            return Err(FloorError::CellTaken {
                position: spawn.position,
                occupant: node.occupying(),
            });
        }

        let unit = Unit::new(spawn.id, spawn.faction, spawn.position, spawn.stats)
            .with_behavior(spawn.behavior);
        self.units
            .insert(unit)
            .map_err(|unit| FloorError::DuplicateUnit { id: unit.id() })?;
        self.grid
            .set_occupancy(spawn.position, spawn.faction.occupancy());
        self.refresh_tiles(spawn.id);

        Ok(spawn.id)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn bounds(&self) -> GridBounds {
        self.grid.bounds()
    }

    pub fn config(&self) -> &TacticsConfig {
        &self.config
    }

    pub fn units(&self) -> &UnitRoster {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id)
    }

    pub fn living(&self, faction: Faction) -> usize {
        self.units.living(faction)
    }

    // ===== lookups =====

    pub fn node_id(&self, position: Position) -> Option<NodeId> {
        self.grid.node_id(position)
    }

    pub fn node_at(&self, position: Position) -> Option<&Node> {
        self.grid.node_at(position)
    }

    pub fn node_at_world(&self, position: WorldPos) -> Option<&Node> {
        self.grid.node_at_world(position)
    }

    pub fn position_of(&self, node: NodeId) -> Option<Position> {
        self.grid.position_of(node)
    }

    /// Node under the unit's rounded position.
    pub fn node_of(&self, unit: UnitId) -> Option<NodeId> {
        let unit = self.units.get(unit)?;
        self.grid.node_id(unit.grid_position())
    }

    /// Unit standing on `node`, found by scanning the roster.
    pub fn occupant_at(&self, node: NodeId) -> Option<UnitId> {
        let position = self.grid.position_of(node)?;
        self.units.at(position).map(Unit::id)
    }

    pub fn unit_at(&self, position: Position) -> Option<&Unit> {
        self.units.at(position)
    }

    // ===== search =====

    pub fn reset_pathing(&mut self) {
        self.grid.reset_pathing();
    }

    /// Boolean pathing contract used by movement and AI.
    pub fn pathing(
        &mut self,
        start: Option<NodeId>,
        end: Option<NodeId>,
        faction: Faction,
        care_about_occupancy: bool,
    ) -> bool {
        let query = self.query(start, end, faction, care_about_occupancy);
        self.grid.pathing(&query)
    }

    pub fn try_pathing(
        &mut self,
        start: Option<NodeId>,
        end: Option<NodeId>,
        faction: Faction,
        care_about_occupancy: bool,
    ) -> Result<PathSummary, PathError> {
        let query = self.query(start, end, faction, care_about_occupancy);
        self.search(&query)
    }

    pub fn reachable_for_movement(&self, start: NodeId, radius: u32, faction: Faction) -> NodeSet {
        self.grid.reachable_for_movement(start, radius, faction)
    }

    pub fn reachable_for_attack(&self, move_set: &NodeSet, radius: u32) -> NodeSet {
        self.grid.reachable_for_attack(move_set, radius)
    }

    pub fn nodes_within_distance(&self, start: NodeId, distance: u32) -> NodeSet {
        self.grid.nodes_within_distance(start, distance)
    }

    // ===== stats and turn bookkeeping =====

    /// Leveling hook. The current turn's spent move range is left at zero.
    pub fn set_move_range(&mut self, id: UnitId, range: u32) -> bool {
        let Some(unit) = self.units.get_mut(id) else {
            return false;
        };
        let mut stats = *unit.stats();
        stats.move_range = range;
        unit.set_stats(stats);
        if !unit.has_moved() {
            unit.move_range = range;
        }
        self.refresh_tiles(id)
    }

    pub fn set_attack_range(&mut self, id: UnitId, range: u32) -> bool {
        let Some(unit) = self.units.get_mut(id) else {
            return false;
        };
        let mut stats = *unit.stats();
        stats.attack_range = range;
        unit.set_stats(stats);
        unit.attack_range = range;
        self.refresh_tiles(id)
    }

    /// Replaces the whole stat block, clamping health to the new maximum.
    pub fn set_stats(&mut self, id: UnitId, stats: UnitStats) -> bool {
        let Some(unit) = self.units.get_mut(id) else {
            return false;
        };
        unit.set_stats(stats);
        unit.health = unit.health.min(stats.max_health);
        if !unit.has_moved() {
            unit.move_range = stats.move_range;
        }
        unit.attack_range = stats.attack_range;
        self.refresh_tiles(id)
    }

    /// Clears the turn flags, restores range from stats and recomputes caches.
    pub fn reset_turn(&mut self, id: UnitId) -> bool {
        let Some(unit) = self.units.get_mut(id) else {
            return false;
        };
        unit.flags = Default::default();
        unit.move_range = unit.stats().move_range;
        unit.attack_range = unit.stats().attack_range;
        self.refresh_tiles(id)
    }

    pub fn reset_faction(&mut self, faction: Faction) {
        for id in self.units.ids_of(faction) {
            self.reset_turn(id);
        }
    }

    /// Removes a unit from the floor.
    ///
    /// Its cell returns to empty unless another unit still stands there, and
    /// all search scratch is cleared. If the unit was mid-move or mid-action the
    /// matching completion signal is raised first so nothing waits forever.
    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(id)?;
        let at = unit.grid_position();

        let mut cells = vec![at];
        if let Motion::Moving { from, .. } = unit.motion()
            && let Some(origin) = self.grid.position_of(*from)
            && origin != at
        {
            cells.push(origin);
        }
        for cell in cells {
            let marker = self.grid.occupancy(cell);
            if marker == Some(unit.faction().occupancy()) && self.units.at(cell).is_none() {
                self.grid.set_occupancy(cell, Occupancy::Empty);
            }
        }
        self.grid.reset_pathing();

        if unit.is_moving() {
            self.emit(BattleEvent::FinishedMoving { unit: id, at });
        }
        if unit.pending().is_some() {
            self.emit(BattleEvent::FinishedAction { unit: id });
        }
        self.emit(BattleEvent::UnitDefeated {
            unit: id,
            faction: unit.faction(),
            at,
        });

        tracing::info!(target: "tactics::grid", unit = %id, position = %at, "unit removed");
        Some(unit)
    }

    /// No unit is mid-move or waiting on an action.
    pub fn is_idle(&self) -> bool {
        self.units.iter().all(|unit| !unit.is_busy())
    }

    // ===== events =====

    pub fn pending_events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: BattleEvent) {
        tracing::trace!(target: "tactics::grid", event = ?event, "battle event");
        self.events.push(event);
    }

    pub(crate) fn next_handle(&mut self, unit: UnitId) -> ActionHandle {
        self.next_serial += 1;
        ActionHandle {
            unit,
            serial: self.next_serial,
        }
    }

    fn query(
        &self,
        start: Option<NodeId>,
        end: Option<NodeId>,
        faction: Faction,
        care_about_occupancy: bool,
    ) -> PathQuery {
        let query = PathQuery::new(start, end, faction)
            .with_max_iterations(self.config.max_search_iterations);
        if care_about_occupancy {
            query
        } else {
            query.ignoring_destination_occupancy()
        }
    }

    /// Runs a search, logging a runaway once at warn level.
    pub(crate) fn search(&mut self, query: &PathQuery) -> Result<PathSummary, PathError> {
        let result = self.grid.try_pathing(query);
        if let Err(error @ PathError::MaxIterationsExceeded { .. }) = &result {
            tracing::warn!(target: "tactics::grid", error = %error, "pathing aborted");
        }
        result
    }
}

#[cfg(test)]
mod tests;
