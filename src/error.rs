//! Error types for the fleet simulation.

use std::collections::TryReserveError;
use thiserror::Error;

use crate::handshake::Phase;
use crate::validation::ValidationError;

/// Errors that can stop the simulation from starting or running.
///
/// Out-of-range water levels and infeasible dispatch passes are not
/// errors; they are reported through [`DispatchReport`](crate::scheduler::DispatchReport).
#[derive(Debug, Error)]
pub enum FleetError {
    /// The configuration failed validation.
    #[error("invalid fleet configuration: {}", format_validation(.0))]
    InvalidConfig(Vec<ValidationError>),

    /// The per-class unit counts do not sum within `usize`.
    #[error("unit counts overflow the addressable fleet size")]
    UnitCountOverflow,

    /// The unit arena could not be allocated.
    #[error("failed to allocate unit registry: {0}")]
    Allocation(#[from] TryReserveError),

    /// A dispatch/sort transition was attempted out of turn.
    #[error("handshake out of turn: expected {expected:?}, found {found:?}")]
    Handshake { expected: Phase, found: Phase },

    /// The handshake channel closed while a task was waiting on it.
    #[error("handshake channel closed")]
    HandshakeClosed,

    /// A spawned fleet task panicked or was aborted.
    #[error("fleet task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
