//! Priority rules and rule engine for ordering the fleet.
//!
//! The registry keeps units ordered by a composed comparator: rules are
//! applied in sequence and the next rule is consulted only on ties.
//!
//! # Usage
//!
//! ```
//! use hydro_dispatch::dispatching::{rules, RuleEngine};
//! use hydro_dispatch::models::{Unit, UnitClass};
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::CapacityDesc)
//!     .with_tie_breaker(rules::RelativeLevelDesc);
//!
//! let big = Unit::new(UnitClass::H1);
//! let small = Unit::new(UnitClass::H3);
//! assert_eq!(engine.compare(&big, &small), std::cmp::Ordering::Less);
//! ```

mod engine;
pub mod rules;

pub use engine::RuleEngine;

use crate::models::Unit;
use std::fmt::Debug;

/// Score returned by a priority rule.
///
/// Lower scores = higher priority (placed first).
pub type RuleScore = f64;

/// A rule that scores a unit's dispatch priority.
///
/// # Score Convention
/// **Lower score = higher priority.** Rules that prefer larger values
/// return the negated quantity.
pub trait PriorityRule: Send + Sync + Debug {
    /// Rule name (e.g., "CAP", "REL").
    fn name(&self) -> &'static str;

    /// Evaluates the priority of a unit.
    fn evaluate(&self, unit: &Unit) -> RuleScore;
}
