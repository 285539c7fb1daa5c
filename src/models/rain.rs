//! Rainfall process.
//!
//! Rain is a three-outcome categorical process. When no event is in
//! progress a new outcome is drawn from a uniform sample; an event then
//! adds a fixed increment to the reservoir on each following tick until
//! its duration runs out.

use serde::{Deserialize, Serialize};

use crate::random::UniformSource;

/// Outcome of a rain draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RainOutcome {
    /// Dry spell: no inflow.
    NoRain,
    /// Moderate rain ("Aguacero").
    Aguacero,
    /// Heavy rain ("Diluvio").
    Diluvio,
}

impl RainOutcome {
    /// Water added per tick while the event lasts.
    pub fn increment(self) -> f64 {
        match self {
            RainOutcome::NoRain => 0.0,
            RainOutcome::Aguacero => 2.0,
            RainOutcome::Diluvio => 4.0,
        }
    }

    /// Number of ticks the event lasts.
    pub fn duration_ticks(self) -> u32 {
        match self {
            RainOutcome::NoRain => 0,
            RainOutcome::Aguacero => 10,
            RainOutcome::Diluvio => 5,
        }
    }
}

/// Probabilities of the three rain outcomes.
///
/// Must sum to 1.0; see [`validate_config`](crate::validation::validate_config).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RainProbabilities {
    /// Probability of no rain.
    pub no_rain: f64,
    /// Probability of moderate rain.
    pub aguacero: f64,
    /// Probability of heavy rain.
    pub diluvio: f64,
}

impl RainProbabilities {
    /// Creates a probability triple.
    pub fn new(no_rain: f64, aguacero: f64, diluvio: f64) -> Self {
        Self {
            no_rain,
            aguacero,
            diluvio,
        }
    }

    /// Sum of the three probabilities.
    pub fn sum(&self) -> f64 {
        self.no_rain + self.aguacero + self.diluvio
    }

    /// Maps a uniform sample in `[0, 1)` onto an outcome using the
    /// cumulative thresholds `no_rain` and `no_rain + aguacero`.
    pub fn classify(&self, sample: f64) -> RainOutcome {
        if sample < self.no_rain {
            RainOutcome::NoRain
        } else if sample < self.no_rain + self.aguacero {
            RainOutcome::Aguacero
        } else {
            RainOutcome::Diluvio
        }
    }
}

impl Default for RainProbabilities {
    fn default() -> Self {
        Self::new(0.5, 0.3, 0.2)
    }
}

/// Per-actor rain state: the running event and its remaining ticks.
#[derive(Debug, Clone, Default)]
pub struct RainProcess {
    remaining_ticks: u32,
    increment: f64,
}

impl RainProcess {
    /// Creates a dry process; the first step draws an outcome.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks left in the current event.
    pub fn remaining_ticks(&self) -> u32 {
        self.remaining_ticks
    }

    /// Advances one tick and returns the inflow for this tick.
    ///
    /// A tick that draws a new outcome contributes no inflow itself; the
    /// event's increment applies from the next tick on.
    pub fn step(&mut self, probabilities: &RainProbabilities, source: &mut dyn UniformSource) -> f64 {
        if self.remaining_ticks > 0 {
            self.remaining_ticks -= 1;
            return self.increment;
        }

        let outcome = probabilities.classify(source.next_uniform());
        self.increment = outcome.increment();
        self.remaining_ticks = outcome.duration_ticks();
        0.0
    }
}
