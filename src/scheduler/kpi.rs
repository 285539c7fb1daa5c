//! Fleet performance indicators (KPIs).
//!
//! Snapshot metrics computed from the registry and the ledger.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total generation | Ledger total |
//! | Active capacity | Sum of capacities of active units |
//! | In band | Total inside `[min, max]` |
//! | Active units | Count of active units, overall and per class |
//! | Mean relative level | Mean fill fraction across the fleet |
//! | Out of range | Units whose level left `[min, max]` |

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::generation::{GenerationBand, GenerationLedger};
use crate::models::UnitClass;
use crate::registry::Registry;

/// Point-in-time fleet indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetKpi {
    /// Aggregate total as recorded by the ledger.
    pub total_generation: f64,
    /// Sum of the capacities of units flagged active.
    pub active_capacity: f64,
    /// Whether the total lies inside the band.
    pub in_band: bool,
    /// Number of units.
    pub units: usize,
    /// Number of active units.
    pub active_units: usize,
    /// Active units per class.
    pub active_by_class: HashMap<UnitClass, usize>,
    /// Mean normalized fill fraction (0.0 for an empty fleet).
    pub mean_relative_level: f64,
    /// Units currently outside their water-level band.
    pub out_of_range: usize,
}

impl FleetKpi {
    /// Computes KPIs from the registry and ledger.
    ///
    /// Take both under the registry lock for a consistent snapshot.
    pub fn capture(registry: &Registry, ledger: &GenerationLedger, band: GenerationBand) -> Self {
        let total_generation = ledger.total();
        let mut active_by_class = HashMap::new();
        let mut relative_sum = 0.0;
        let mut out_of_range = 0;

        for unit in registry.units() {
            relative_sum += unit.relative_level();
            if !unit.is_within_range() {
                out_of_range += 1;
            }
            if unit.is_active() {
                *active_by_class.entry(unit.class()).or_insert(0) += 1;
            }
        }

        let units = registry.len();
        let mean_relative_level = if units == 0 {
            0.0
        } else {
            relative_sum / units as f64
        };

        Self {
            total_generation,
            active_capacity: registry.active_capacity(),
            in_band: band.contains(total_generation),
            units,
            active_units: registry.active_count(),
            active_by_class,
            mean_relative_level,
            out_of_range,
        }
    }

    /// Whether the ledger total agrees with the active flags.
    pub fn is_consistent(&self) -> bool {
        (self.total_generation - self.active_capacity).abs() < 1e-9
    }

    /// Active units of one class.
    pub fn active_of(&self, class: UnitClass) -> usize {
        self.active_by_class.get(&class).copied().unwrap_or(0)
    }
}
