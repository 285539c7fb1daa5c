//! Aggregate generation accounting.
//!
//! [`GenerationLedger`] owns the fleet-wide generation total. Its
//! [`activate`](GenerationLedger::activate) and
//! [`deactivate`](GenerationLedger::deactivate) are the only operations that
//! flip a unit's active flag, and each flips the flag and adjusts the total
//! under the same lock, so the total always equals the summed capacity of
//! the active units.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::models::Unit;
use crate::registry::Registry;

/// Lower bound of the admissible generation band.
pub const MIN_GENERATION: f64 = 100.0;

/// Upper bound of the admissible generation band.
pub const MAX_GENERATION: f64 = 150.0;

/// Admissible aggregate output range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationBand {
    /// Lowest acceptable total.
    pub min: f64,
    /// Highest acceptable total.
    pub max: f64,
}

impl GenerationBand {
    /// Creates a band.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `total` lies inside the closed band.
    pub fn contains(&self, total: f64) -> bool {
        total >= self.min && total <= self.max
    }

    /// Whether adding `capacity` to `total` stays at or below the ceiling.
    pub fn fits(&self, total: f64, capacity: f64) -> bool {
        total + capacity <= self.max
    }
}

impl Default for GenerationBand {
    fn default() -> Self {
        Self::new(MIN_GENERATION, MAX_GENERATION)
    }
}

/// Shared aggregate generation total.
#[derive(Debug, Default)]
pub struct GenerationLedger {
    total: Mutex<f64>,
}

impl GenerationLedger {
    /// Creates a ledger at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current aggregate total.
    pub fn total(&self) -> f64 {
        *self.total.lock()
    }

    /// Marks the unit active and credits its capacity.
    ///
    /// Returns `false` (and changes nothing) if it was already active.
    pub fn activate(&self, unit: &mut Unit) -> bool {
        let mut total = self.total.lock();
        if unit.active {
            return false;
        }
        unit.active = true;
        *total += unit.capacity();
        true
    }

    /// Marks the unit inactive and debits its capacity.
    ///
    /// Returns `false` (and changes nothing) if it was already inactive.
    pub fn deactivate(&self, unit: &mut Unit) -> bool {
        let mut total = self.total.lock();
        if !unit.active {
            return false;
        }
        unit.active = false;
        *total -= unit.capacity();
        true
    }

    /// Deactivates every unit in the registry.
    pub fn deactivate_all(&self, registry: &mut Registry) {
        let (order, units) = registry.split_ordered_mut();
        for id in order {
            self.deactivate(&mut units[id.index()]);
        }
    }
}
