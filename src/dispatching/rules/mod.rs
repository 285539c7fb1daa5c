//! Built-in priority rules.
//!
//! - **Capacity**: `CapacityDesc`
//! - **Water level**: `RelativeLevelDesc`
//!
//! # Score Convention
//! All rules return lower scores for higher priority units.

use super::{PriorityRule, RuleScore};
use crate::models::Unit;

/// Largest capacity first.
///
/// Primary key of the fleet order: big plants cover the band with the
/// fewest activations.
#[derive(Debug, Clone, Copy)]
pub struct CapacityDesc;

impl PriorityRule for CapacityDesc {
    fn name(&self) -> &'static str {
        "CAP"
    }

    fn evaluate(&self, unit: &Unit) -> RuleScore {
        -unit.capacity()
    }
}

/// Fullest reservoir first, by normalized fill fraction.
///
/// `(level - min) / (max - min)`, so units with different operating
/// bands compare fairly.
#[derive(Debug, Clone, Copy)]
pub struct RelativeLevelDesc;

impl PriorityRule for RelativeLevelDesc {
    fn name(&self) -> &'static str {
        "REL"
    }

    fn evaluate(&self, unit: &Unit) -> RuleScore {
        -unit.relative_level()
    }
}
