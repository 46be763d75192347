use crate::grid::{Faction, Position};

use super::{Unit, UnitId};

/// Living units of a floor, in spawn order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnitRoster {
    units: Vec<Unit>,
}

impl UnitRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.id() == id)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|unit| unit.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.units.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Unit> + '_ {
        self.units.iter_mut()
    }

    pub fn of_faction(&self, faction: Faction) -> impl Iterator<Item = &Unit> + '_ {
        self.units.iter().filter(move |unit| unit.faction() == faction)
    }

    pub fn ids_of(&self, faction: Faction) -> Vec<UnitId> {
        self.of_faction(faction).map(Unit::id).collect()
    }

    pub fn living(&self, faction: Faction) -> usize {
        self.of_faction(faction).filter(|unit| unit.is_alive()).count()
    }

    /// Linear scan comparing each unit's rounded position to `position`.
    pub fn at(&self, position: Position) -> Option<&Unit> {
        self.units
            .iter()
            .find(|unit| unit.grid_position() == position)
    }

    /// True if any unit other than `except` physically stands on `position`.
    pub fn anyone_else_at(&self, position: Position, except: UnitId) -> bool {
        self.units
            .iter()
            .any(|unit| unit.id() != except && unit.grid_position() == position)
    }

    /// Inserts a unit; returns it back if the id is already taken.
    pub fn insert(&mut self, unit: Unit) -> Result<(), Unit> {
        if self.contains(unit.id()) {
            return Err(unit);
        }
        self.units.push(unit);
        Ok(())
    }

    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        let index = self.units.iter().position(|unit| unit.id() == id)?;
        Some(self.units.remove(index))
    }
}
