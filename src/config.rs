//! Configuration types for the fleet simulation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::generation::GenerationBand;
use crate::models::{RainProbabilities, UnitClass};

/// Default pause between unit ticks (milliseconds).
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;

/// Number of units to build per class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCounts {
    /// Large units.
    pub h1: usize,
    /// Medium units.
    pub h2: usize,
    /// Small units.
    pub h3: usize,
}

impl UnitCounts {
    /// Creates a count triple.
    pub fn new(h1: usize, h2: usize, h3: usize) -> Self {
        Self { h1, h2, h3 }
    }

    /// Count for a single class.
    pub fn count(&self, class: UnitClass) -> usize {
        match class {
            UnitClass::H1 => self.h1,
            UnitClass::H2 => self.h2,
            UnitClass::H3 => self.h3,
        }
    }

    /// Total number of units, or `None` if it overflows `usize`.
    pub fn total(&self) -> Option<usize> {
        self.h1.checked_add(self.h2)?.checked_add(self.h3)
    }

    /// Sum of the capacities of every unit.
    pub fn installed_capacity(&self) -> f64 {
        UnitClass::ALL
            .iter()
            .map(|&c| c.capacity() * self.count(c) as f64)
            .sum()
    }
}

/// Top-level simulation configuration.
///
/// Produced by the CLI layer (or deserialized from JSON/TOML) and checked
/// by [`validate_config`](crate::validation::validate_config) before any
/// task starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Rain outcome probabilities.
    pub probabilities: RainProbabilities,

    /// Units per class.
    pub units: UnitCounts,

    /// Admissible aggregate generation.
    pub band: GenerationBand,

    /// Pause between unit ticks in milliseconds.
    pub tick_interval_ms: u64,

    /// Seed for the per-unit rain sources; OS-seeded when absent.
    pub seed: Option<u64>,
}

impl FleetConfig {
    /// Creates a configuration with default band and pacing.
    pub fn new(probabilities: RainProbabilities, units: UnitCounts) -> Self {
        Self {
            probabilities,
            units,
            ..Default::default()
        }
    }

    /// Sets the generation band.
    pub fn with_band(mut self, band: GenerationBand) -> Self {
        self.band = band;
        self
    }

    /// Sets the tick interval.
    pub fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.tick_interval_ms = ms;
        self
    }

    /// Sets the rain seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Tick interval as a `Duration`.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            probabilities: RainProbabilities::default(),
            units: UnitCounts::new(7, 0, 0),
            band: GenerationBand::default(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            seed: None,
        }
    }
}
