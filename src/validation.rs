//! Input validation for fleet configurations.
//!
//! Checks a [`FleetConfig`] before any unit is built. Detects:
//! - Rain probabilities outside `[0, 1]` or not summing to 1.0
//! - An empty or inverted generation band
//! - Installed capacity that can never reach the band minimum
//! - A zero tick interval

use crate::config::FleetConfig;

/// Tolerance for the probability sum check.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Probabilities do not sum to 1.0.
    ProbabilitySum,
    /// A probability is negative, above 1.0 or not finite.
    ProbabilityRange,
    /// Installed capacity is below the band minimum.
    InsufficientCapacity,
    /// Band bounds are negative, non-finite or inverted.
    InvalidBand,
    /// Tick interval is zero.
    InvalidTickInterval,
    /// Unit counts sum past the addressable fleet size.
    UnitCount,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a fleet configuration.
///
/// Checks:
/// 1. Each probability is finite and within `[0, 1]`
/// 2. Probabilities sum to 1.0 (within [`PROBABILITY_SUM_TOLERANCE`])
/// 3. The band is finite, non-negative and `min <= max`
/// 4. Installed capacity reaches the band minimum
/// 5. The tick interval is non-zero
/// 6. The unit counts sum within `usize`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_config(config: &FleetConfig) -> ValidationResult {
    let mut errors = Vec::new();
    let p = &config.probabilities;

    for (name, value) in [
        ("no_rain", p.no_rain),
        ("aguacero", p.aguacero),
        ("diluvio", p.diluvio),
    ] {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            errors.push(ValidationError::new(
                ValidationErrorKind::ProbabilityRange,
                format!("Probability '{name}' must be within [0, 1], got {value}"),
            ));
        }
    }

    let sum = p.sum();
    if !sum.is_finite() || (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        errors.push(ValidationError::new(
            ValidationErrorKind::ProbabilitySum,
            format!("Rain probabilities must sum to 1.0, got {sum}"),
        ));
    }

    let band = &config.band;
    let band_ok = band.min.is_finite() && band.max.is_finite() && band.min >= 0.0 && band.min <= band.max;
    if !band_ok {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidBand,
            format!("Generation band [{}, {}] is invalid", band.min, band.max),
        ));
    }

    if config.units.total().is_none() {
        errors.push(ValidationError::new(
            ValidationErrorKind::UnitCount,
            format!(
                "Unit counts ({}, {}, {}) exceed the addressable fleet size",
                config.units.h1, config.units.h2, config.units.h3
            ),
        ));
    }

    let installed = config.units.installed_capacity();
    if band_ok && installed < band.min {
        errors.push(ValidationError::new(
            ValidationErrorKind::InsufficientCapacity,
            format!(
                "Installed capacity {installed} is below the minimum generation {}",
                band.min
            ),
        ));
    }

    if config.tick_interval_ms == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidTickInterval,
            "Tick interval must be greater than zero",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
