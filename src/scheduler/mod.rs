//! Dispatch algorithms and fleet KPIs.
//!
//! Provides the dispatcher that decides which units generate, and
//! snapshot metrics for the fleet.
//!
//! # Algorithm
//!
//! `Dispatcher` runs a greedy priority-order fill and, when that misses the
//! generation band, a contiguous-window search over the current order. It
//! is not optimal, but it is fast and deterministic for a given order.
//!
//! # KPI
//!
//! `FleetKpi` computes generation total, band membership, active counts
//! and fill levels.

mod dispatcher;
mod kpi;

pub use dispatcher::{DispatchReport, DispatchStrategy, Dispatcher, WindowSearch};
pub use kpi::FleetKpi;
