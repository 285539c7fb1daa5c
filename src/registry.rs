//! Priority-ordered unit registry.
//!
//! Units live in an index-stable arena; a separate `order` vector holds
//! their ids in priority order. Re-sorting only permutes `order`, so a
//! [`UnitId`] stays valid for the lifetime of the registry and the set of
//! units never changes after startup.
//!
//! The registry itself is not synchronized. The shared instance sits
//! behind the lock in [`FleetContext`](crate::context::FleetContext), and
//! every pass that reads or rewrites the order holds that lock for its
//! full duration.

use std::cmp::Ordering;

use tracing::debug;

use crate::config::UnitCounts;
use crate::dispatching::RuleEngine;
use crate::error::FleetError;
use crate::models::{Unit, UnitClass, UnitId};

/// Arena of units plus their priority order.
#[derive(Debug, Clone)]
pub struct Registry {
    units: Vec<Unit>,
    order: Vec<UnitId>,
    engine: RuleEngine,
}

impl Registry {
    /// Creates an empty registry ordered by `engine`.
    pub fn new(engine: RuleEngine) -> Self {
        Self {
            units: Vec::new(),
            order: Vec::new(),
            engine,
        }
    }

    /// Builds the fleet for the given counts with the default order.
    ///
    /// Every unit starts inactive at the midpoint of its band. Fails with
    /// [`FleetError::UnitCountOverflow`] when the counts do not sum within
    /// `usize`, and with [`FleetError::Allocation`] when the arena cannot be
    /// reserved.
    pub fn from_counts(counts: &UnitCounts) -> Result<Self, FleetError> {
        let total = counts.total().ok_or(FleetError::UnitCountOverflow)?;
        let mut registry = Self::new(RuleEngine::fleet_default());
        registry.reserve(total)?;

        for class in UnitClass::ALL {
            for _ in 0..counts.count(class) {
                registry.insert_sorted(Unit::new(class))?;
            }
        }

        debug!(units = registry.len(), "Registry built");
        Ok(registry)
    }

    /// Reserves space for `additional` more units.
    pub fn reserve(&mut self, additional: usize) -> Result<(), FleetError> {
        self.units.try_reserve_exact(additional)?;
        self.order.try_reserve_exact(additional)?;
        Ok(())
    }

    /// Inserts a unit at its priority position and returns its id.
    ///
    /// The unit goes after every unit it does not strictly precede, so
    /// equal units keep insertion order.
    pub fn insert_sorted(&mut self, mut unit: Unit) -> Result<UnitId, FleetError> {
        self.reserve(1)?;

        let id = UnitId(self.units.len());
        unit.assign_id(id);

        let position = self.position_for(&unit, &self.order);
        self.units.push(unit);
        self.order.insert(position, id);
        Ok(id)
    }

    /// Rebuilds the priority order from scratch.
    ///
    /// Insertion sort over the current order: each unit is moved to the
    /// first slot where it precedes the unit already there. Water levels
    /// drift between passes without maintaining order, so nothing about
    /// the previous order is assumed.
    pub fn resort(&mut self) {
        let mut sorted: Vec<UnitId> = Vec::with_capacity(self.order.len());
        for &id in &self.order {
            let position = self.position_for(&self.units[id.index()], &sorted);
            sorted.insert(position, id);
        }
        self.order = sorted;
    }

    fn position_for(&self, unit: &Unit, order: &[UnitId]) -> usize {
        order
            .iter()
            .position(|&other| self.engine.compare(unit, &self.units[other.index()]) == Ordering::Less)
            .unwrap_or(order.len())
    }

    /// Whether the current order agrees with the comparator.
    pub fn is_sorted(&self) -> bool {
        self.order.windows(2).all(|w| {
            self.engine
                .compare(&self.units[w[0].index()], &self.units[w[1].index()])
                != Ordering::Greater
        })
    }

    /// Whether `order` holds every unit exactly once.
    pub fn check_integrity(&self) -> bool {
        if self.order.len() != self.units.len() {
            return false;
        }
        let mut seen = vec![false; self.units.len()];
        for id in &self.order {
            match seen.get_mut(id.index()) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the registry holds no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Unit ids in priority order.
    pub fn order(&self) -> &[UnitId] {
        &self.order
    }

    /// Units in arena (id) order.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Looks up a unit.
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id.index())
    }

    /// Looks up a unit mutably.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(id.index())
    }

    /// Units in priority order.
    pub fn iter_ordered(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.order.iter().map(move |id| &self.units[id.index()])
    }

    /// Splits into the priority order and the mutable arena, so a pass
    /// can walk the order while mutating units.
    pub(crate) fn split_ordered_mut(&mut self) -> (&[UnitId], &mut [Unit]) {
        (&self.order, &mut self.units)
    }

    /// Sum of all capacities.
    pub fn installed_capacity(&self) -> f64 {
        self.units.iter().map(|u| u.capacity()).sum()
    }

    /// Sum of the capacities of active units.
    pub fn active_capacity(&self) -> f64 {
        self.units
            .iter()
            .filter(|u| u.is_active())
            .map(|u| u.capacity())
            .sum()
    }

    /// Number of active units.
    pub fn active_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_active()).count()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(RuleEngine::fleet_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(registry: &Registry) -> Vec<UnitClass> {
        registry.iter_ordered().map(|u| u.class()).collect()
    }

    #[test]
    fn test_from_counts_orders_by_capacity() {
        let registry = Registry::from_counts(&UnitCounts::new(2, 1, 2)).unwrap();
        assert_eq!(registry.len(), 5);
        assert_eq!(
            classes(&registry),
            vec![UnitClass::H1, UnitClass::H1, UnitClass::H2, UnitClass::H3, UnitClass::H3]
        );
        assert!(registry.is_sorted());
        assert!(registry.check_integrity());
    }

    #[test]
    fn test_insert_sorted_places_small_first_inserted_last() {
        let mut registry = Registry::default();
        registry.insert_sorted(Unit::new(UnitClass::H3)).unwrap();
        registry.insert_sorted(Unit::new(UnitClass::H2)).unwrap();
        registry.insert_sorted(Unit::new(UnitClass::H1)).unwrap();
        assert_eq!(
            classes(&registry),
            vec![UnitClass::H1, UnitClass::H2, UnitClass::H3]
        );
        assert_eq!(registry.order(), &[UnitId(2), UnitId(1), UnitId(0)]);
    }

    #[test]
    fn test_equal_units_keep_insertion_order() {
        let mut registry = Registry::default();
        for _ in 0..4 {
            registry.insert_sorted(Unit::new(UnitClass::H2)).unwrap();
        }
        assert_eq!(
            registry.order(),
            &[UnitId(0), UnitId(1), UnitId(2), UnitId(3)]
        );
        registry.resort();
        assert_eq!(
            registry.order(),
            &[UnitId(0), UnitId(1), UnitId(2), UnitId(3)]
        );
    }

    #[test]
    fn test_resort_after_level_drift() {
        let mut registry = Registry::from_counts(&UnitCounts::new(3, 0, 0)).unwrap();
        registry.get_mut(UnitId(2)).unwrap().set_water_level(190.0);
        registry.get_mut(UnitId(0)).unwrap().set_water_level(60.0);
        assert!(!registry.is_sorted());

        registry.resort();
        assert!(registry.is_sorted());
        assert_eq!(registry.order(), &[UnitId(2), UnitId(1), UnitId(0)]);
    }

    #[test]
    fn test_relative_level_across_classes_within_capacity() {
        // Capacity still dominates: a nearly empty H1 stays ahead of a full H3.
        let mut registry = Registry::default();
        registry
            .insert_sorted(Unit::new(UnitClass::H3).with_water_level(49.0))
            .unwrap();
        registry
            .insert_sorted(Unit::new(UnitClass::H1).with_water_level(51.0))
            .unwrap();
        assert_eq!(classes(&registry), vec![UnitClass::H1, UnitClass::H3]);
    }

    #[test]
    fn test_resort_is_idempotent() {
        let mut registry = Registry::from_counts(&UnitCounts::new(3, 3, 3)).unwrap();
        for (i, level) in [70.0, 180.0, 120.0].into_iter().enumerate() {
            registry.get_mut(UnitId(i)).unwrap().set_water_level(level);
        }
        registry.resort();
        let first = registry.order().to_vec();
        registry.resort();
        assert_eq!(registry.order(), first.as_slice());
    }

    #[test]
    fn test_integrity_survives_many_resorts() {
        let mut registry = Registry::from_counts(&UnitCounts::new(4, 4, 4)).unwrap();
        for round in 0..20 {
            for i in 0..registry.len() {
                let unit = registry.get_mut(UnitId(i)).unwrap();
                let span = unit.max_water_level() - unit.min_water_level();
                let level = unit.min_water_level() + span * (((i * 7 + round * 3) % 11) as f64 / 10.0);
                unit.set_water_level(level);
            }
            registry.resort();
            assert!(registry.check_integrity());
            assert!(registry.is_sorted());
            assert_eq!(registry.len(), 12);
        }
    }

    #[test]
    fn test_from_counts_rejects_overflowing_total() {
        let result = Registry::from_counts(&UnitCounts::new(usize::MAX, 1, 0));
        assert!(matches!(result, Err(FleetError::UnitCountOverflow)));
    }

    #[test]
    fn test_from_counts_reports_allocation_failure() {
        let result = Registry::from_counts(&UnitCounts::new(usize::MAX / 2, 0, 0));
        assert!(matches!(result, Err(FleetError::Allocation(_))));
    }

    #[test]
    fn test_empty_registry() {
        let mut registry = Registry::from_counts(&UnitCounts::default()).unwrap();
        registry.resort();
        assert!(registry.is_empty());
        assert!(registry.check_integrity());
        assert!(registry.installed_capacity().abs() < 1e-10);
    }
}
