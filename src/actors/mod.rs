//! Concurrent tasks of the fleet simulation.
//!
//! ```text
//! UnitActor (one per unit) ── request_dispatch ──▶ Coordinator
//!                                                   │ begin_dispatch
//!                                                   │ dispatch pass (registry locked)
//!                                                   │ finish_dispatch
//!                                                   ▼
//!                                               Reranker
//!                                                   │ resort (registry locked)
//!                                                   │ finish_sort
//!                                                   ▼
//!                                           Coordinator waits again
//! ```
//!
//! Every task exits once the shared stop token is cancelled; each blocking
//! wait races the token.

mod coordinator;
mod reranker;
mod unit_actor;

pub use coordinator::Coordinator;
pub use reranker::Reranker;
pub use unit_actor::{TickOutcome, UnitActor, DRAWDOWN_PER_TICK};
