//! Greedy dispatcher with contiguous-window fallback.
//!
//! # Algorithm
//!
//! 1. **Greedy**: reset every unit, then walk the registry in priority
//!    order activating each unit that has water above its minimum and fits
//!    under the band ceiling; stop once the band floor is reached.
//! 2. **Fallback** (only when the greedy total is outside the band): reset
//!    again, then for every start position simulate the same walk from
//!    that position onward until the running total first lands in the
//!    band. The highest landing total wins. Activation is then replayed
//!    from the head of the registry against the remaining budget
//!    `max - best`.
//!
//! The fallback only looks at contiguous suffixes of the current order. A
//! non-contiguous subset that lands in the band can be missed.
//!
//! # Complexity
//! Greedy O(n); fallback O(n²).
//!
//! Both passes expect the caller to hold the registry lock for the whole
//! call.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::generation::{GenerationBand, GenerationLedger};
use crate::models::UnitId;
use crate::registry::Registry;

/// Which algorithm produced the final activation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchStrategy {
    /// The greedy pass landed in the band.
    Greedy,
    /// The window search ran after the greedy pass missed the band.
    Fallback,
}

/// Best start position found by the window search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSearch {
    /// Registry position the window starts at.
    pub start: usize,
    /// Total the simulated walk reached.
    pub total: f64,
    /// Whether the walk landed inside the band. When no start does, the
    /// search reports the start with the highest total instead.
    pub feasible: bool,
}

/// Outcome of one dispatch pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Algorithm that produced the activation set.
    pub strategy: DispatchStrategy,
    /// Aggregate generation after the pass.
    pub total: f64,
    /// Number of active units after the pass.
    pub active_units: usize,
    /// Whether `total` lies inside the band.
    pub feasible: bool,
    /// Window search result, when the fallback ran on a non-empty fleet.
    pub window: Option<WindowSearch>,
}

#[derive(Debug, Default)]
struct WindowWalk {
    total: f64,
    feasible: bool,
    selected: Vec<UnitId>,
}

/// Decides which units generate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher {
    band: GenerationBand,
}

impl Dispatcher {
    /// Creates a dispatcher for the given band.
    pub fn new(band: GenerationBand) -> Self {
        Self { band }
    }

    /// Target band.
    pub fn band(&self) -> GenerationBand {
        self.band
    }

    /// Runs a full dispatch pass: greedy, then fallback if needed.
    pub fn dispatch(&self, registry: &mut Registry, ledger: &GenerationLedger) -> DispatchReport {
        let greedy_total = self.greedy(registry, ledger);
        if self.band.contains(greedy_total) {
            return self.report(DispatchStrategy::Greedy, registry, ledger, None);
        }

        debug!(
            total = greedy_total,
            min = self.band.min,
            max = self.band.max,
            "Greedy pass missed the band, searching windows"
        );
        let window = self.fallback(registry, ledger);
        self.report(DispatchStrategy::Fallback, registry, ledger, window)
    }

    /// Greedy window-fill. Returns the running total reached.
    pub fn greedy(&self, registry: &mut Registry, ledger: &GenerationLedger) -> f64 {
        ledger.deactivate_all(registry);

        let (order, units) = registry.split_ordered_mut();
        let mut running = 0.0;
        for id in order {
            let unit = &mut units[id.index()];
            if unit.is_above_min() && self.band.fits(running, unit.capacity()) {
                ledger.activate(unit);
                running += unit.capacity();
                if running >= self.band.min {
                    break;
                }
            }
        }
        running
    }

    /// Contiguous-window fallback. Returns the search result, or `None`
    /// for an empty registry.
    pub fn fallback(
        &self,
        registry: &mut Registry,
        ledger: &GenerationLedger,
    ) -> Option<WindowSearch> {
        ledger.deactivate_all(registry);
        let search = self.search_windows(registry)?;

        if search.feasible {
            let mut best_total = search.total;
            let (order, units) = registry.split_ordered_mut();
            for id in order {
                let unit = &mut units[id.index()];
                if unit.is_strictly_within_range() && unit.capacity() <= self.band.max - best_total {
                    ledger.activate(unit);
                    best_total += unit.capacity();
                } else {
                    ledger.deactivate(unit);
                }
            }
        } else {
            for id in self.walk_window(registry, search.start).selected {
                if let Some(unit) = registry.get_mut(id) {
                    ledger.activate(unit);
                }
            }
        }

        Some(search)
    }

    /// Scans every start position without touching the registry.
    ///
    /// Returns the start with the highest in-band landing total (earliest
    /// wins ties); if none lands in the band, the start with the highest
    /// total overall.
    pub fn search_windows(&self, registry: &Registry) -> Option<WindowSearch> {
        let mut best: Option<WindowSearch> = None;
        let mut best_effort: Option<WindowSearch> = None;

        for start in 0..registry.len() {
            let walk = self.walk_window(registry, start);
            let candidate = WindowSearch {
                start,
                total: walk.total,
                feasible: walk.feasible,
            };
            let slot = if walk.feasible { &mut best } else { &mut best_effort };
            if slot.map_or(true, |b| candidate.total > b.total) {
                *slot = Some(candidate);
            }
        }

        best.or(best_effort)
    }

    fn walk_window(&self, registry: &Registry, start: usize) -> WindowWalk {
        let mut walk = WindowWalk::default();
        for unit in registry.iter_ordered().skip(start) {
            if unit.is_above_min() && self.band.fits(walk.total, unit.capacity()) {
                walk.total += unit.capacity();
                walk.selected.push(unit.id());
                if self.band.contains(walk.total) {
                    walk.feasible = true;
                    break;
                }
            }
        }
        walk
    }

    fn report(
        &self,
        strategy: DispatchStrategy,
        registry: &Registry,
        ledger: &GenerationLedger,
        window: Option<WindowSearch>,
    ) -> DispatchReport {
        let total = ledger.total();
        DispatchReport {
            strategy,
            total,
            active_units: registry.active_count(),
            feasible: self.band.contains(total),
            window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnitCounts;
    use crate::models::{Unit, UnitClass};

    fn fleet(h1: usize, h2: usize, h3: usize) -> Registry {
        Registry::from_counts(&UnitCounts::new(h1, h2, h3)).unwrap()
    }

    fn assert_ledger_consistent(registry: &Registry, ledger: &GenerationLedger) {
        assert!((ledger.total() - registry.active_capacity()).abs() < 1e-10);
    }

    #[test]
    fn test_greedy_stops_at_floor() {
        let mut registry = fleet(8, 0, 0);
        let ledger = GenerationLedger::new();
        let report = Dispatcher::default().dispatch(&mut registry, &ledger);

        assert_eq!(report.strategy, DispatchStrategy::Greedy);
        assert!((report.total - 105.0).abs() < 1e-10);
        assert_eq!(report.active_units, 7);
        assert!(report.feasible);
        assert!(report.window.is_none());
        assert!(!registry.get(registry.order()[7]).unwrap().is_active());
        assert_ledger_consistent(&registry, &ledger);
    }

    #[test]
    fn test_greedy_skips_units_at_minimum() {
        let mut registry = fleet(8, 0, 0);
        let head = registry.order()[0];
        registry.get_mut(head).unwrap().set_water_level(50.0);
        let ledger = GenerationLedger::new();
        let report = Dispatcher::default().dispatch(&mut registry, &ledger);

        assert!(!registry.get(head).unwrap().is_active());
        assert_eq!(report.active_units, 7);
        assert!((report.total - 105.0).abs() < 1e-10);
        assert_ledger_consistent(&registry, &ledger);
    }

    #[test]
    fn test_greedy_never_exceeds_ceiling() {
        let dispatcher = Dispatcher::default();
        for h1 in 0..12 {
            for h2 in [0, 3, 9] {
                for h3 in [0, 4, 30] {
                    let mut registry = fleet(h1, h2, h3);
                    let ledger = GenerationLedger::new();
                    let total = dispatcher.greedy(&mut registry, &ledger);
                    assert!(total <= 150.0);
                    assert_ledger_consistent(&registry, &ledger);
                }
            }
        }
    }

    #[test]
    fn test_greedy_resets_previous_activation() {
        let mut registry = fleet(8, 0, 0);
        let ledger = GenerationLedger::new();
        let last = registry.order()[7];
        ledger.activate(registry.get_mut(last).unwrap());

        Dispatcher::default().greedy(&mut registry, &ledger);
        assert!(!registry.get(last).unwrap().is_active());
        assert!((ledger.total() - 105.0).abs() < 1e-10);
    }

    #[test]
    fn test_infeasible_fleet_keeps_best_effort() {
        // 3 × H1 + 2 × H2 can reach at most 55.
        let mut registry = fleet(3, 2, 0);
        let ledger = GenerationLedger::new();
        let report = Dispatcher::default().dispatch(&mut registry, &ledger);

        assert_eq!(report.strategy, DispatchStrategy::Fallback);
        assert!(!report.feasible);
        assert!((report.total - 55.0).abs() < 1e-10);
        assert_eq!(report.active_units, 5);
        let window = report.window.unwrap();
        assert_eq!(window.start, 0);
        assert!(!window.feasible);
        assert_ledger_consistent(&registry, &ledger);
        assert!(registry.check_integrity());
    }

    #[test]
    fn test_search_prefers_highest_feasible_window() {
        // Order: H1, H2, H2, H3, H3, H3. H1 alone overshoots 12.
        let registry = fleet(1, 2, 3);
        let dispatcher = Dispatcher::new(GenerationBand::new(10.0, 12.0));
        let search = dispatcher.search_windows(&registry).unwrap();

        assert!(search.feasible);
        assert_eq!(search.start, 2);
        assert!((search.total - 11.0).abs() < 1e-10);

        for start in 0..registry.len() {
            let walk = dispatcher.walk_window(&registry, start);
            if walk.feasible {
                assert!(walk.total <= search.total);
            }
        }
    }

    #[test]
    fn test_search_window_through_largest_unit() {
        let registry = fleet(1, 2, 3);
        let dispatcher = Dispatcher::new(GenerationBand::new(16.0, 18.0));
        let search = dispatcher.search_windows(&registry).unwrap();
        assert_eq!(search.start, 0);
        assert!((search.total - 17.0).abs() < 1e-10);
    }

    #[test]
    fn test_search_keeps_earliest_on_tie() {
        // Starts 0 and 1 both land on exactly 10.
        let registry = fleet(1, 2, 3);
        let dispatcher = Dispatcher::new(GenerationBand::new(10.0, 10.0));
        let search = dispatcher.search_windows(&registry).unwrap();
        assert_eq!(search.start, 0);
        assert!((search.total - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_fallback_replays_against_remaining_budget() {
        // Greedy takes H1 (15) and nothing else fits under 16. The window
        // starting at the first H2 lands exactly on 16, leaving a zero
        // budget for the replay.
        let mut registry = fleet(1, 2, 3);
        let ledger = GenerationLedger::new();
        let dispatcher = Dispatcher::new(GenerationBand::new(16.0, 16.0));
        let report = dispatcher.dispatch(&mut registry, &ledger);

        assert_eq!(report.strategy, DispatchStrategy::Fallback);
        let window = report.window.unwrap();
        assert!(window.feasible);
        assert_eq!(window.start, 1);
        assert!((window.total - 16.0).abs() < 1e-10);
        assert_eq!(report.active_units, 0);
        assert!(!report.feasible);
        assert_ledger_consistent(&registry, &ledger);
    }

    #[test]
    fn test_feasible_replay_skips_units_at_band_edges() {
        let mut registry = Registry::default();
        registry
            .insert_sorted(Unit::new(UnitClass::H2).with_water_level(100.0))
            .unwrap();
        registry.insert_sorted(Unit::new(UnitClass::H3)).unwrap();
        registry.insert_sorted(Unit::new(UnitClass::H3)).unwrap();
        let ledger = GenerationLedger::new();

        // Windows: start 0 lands on 7; replay budget is 9 - 7 = 2.
        let dispatcher = Dispatcher::new(GenerationBand::new(6.0, 9.0));
        let window = dispatcher.fallback(&mut registry, &ledger).unwrap();
        assert!(window.feasible);
        assert!((window.total - 7.0).abs() < 1e-10);

        // The full H2 sits at its maximum and is skipped; one H3 fits.
        assert!(!registry.get(UnitId(0)).unwrap().is_active());
        assert_eq!(registry.active_count(), 1);
        assert!((ledger.total() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_registry() {
        let mut registry = Registry::default();
        let ledger = GenerationLedger::new();
        let report = Dispatcher::default().dispatch(&mut registry, &ledger);
        assert_eq!(report.strategy, DispatchStrategy::Fallback);
        assert!(report.window.is_none());
        assert_eq!(report.active_units, 0);
        assert!(!report.feasible);
    }
}
