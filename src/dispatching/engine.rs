//! Rule engine for multi-key fleet ordering.
//!
//! Composes priority rules into a single comparator: each rule is
//! consulted in turn and the next one only breaks ties.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{rules, PriorityRule};
use crate::models::Unit;

/// A composable comparator over units.
///
/// Units that tie on every rule compare equal, so insertion keeps their
/// current relative order.
///
/// # Example
/// ```
/// use hydro_dispatch::dispatching::{rules, RuleEngine};
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::CapacityDesc)
///     .with_tie_breaker(rules::RelativeLevelDesc);
/// assert_eq!(engine.rule_names(), vec!["CAP", "REL"]);
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn PriorityRule>>,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            epsilon: 1e-9,
        }
    }

    /// The fleet order: descending capacity, then descending relative
    /// water level.
    pub fn fleet_default() -> Self {
        Self::new()
            .with_rule(rules::CapacityDesc)
            .with_tie_breaker(rules::RelativeLevelDesc)
    }

    /// Adds a primary rule.
    pub fn with_rule<R: PriorityRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Adds a rule consulted only when all earlier rules tie.
    ///
    /// Equivalent to [`with_rule`](Self::with_rule); kept for readability
    /// at call sites.
    pub fn with_tie_breaker<R: PriorityRule + 'static>(self, rule: R) -> Self {
        self.with_rule(rule)
    }

    /// Names of the configured rules, in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Compares two units. `Less` means `a` is placed before `b`.
    pub fn compare(&self, a: &Unit, b: &Unit) -> Ordering {
        for rule in &self.rules {
            let score_a = rule.evaluate(a);
            let score_b = rule.evaluate(b);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal);
            }
        }

        Ordering::Equal
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::fleet_default()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_names())
            .field("epsilon", &self.epsilon)
            .finish()
    }
}
