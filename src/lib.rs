//! Concurrent hydroelectric fleet dispatch simulation.
//!
//! A fleet of generating units sits on rain-fed reservoirs. Each unit is
//! driven by its own actor task; a coordinator keeps the aggregate output
//! inside a generation band, and a re-ranker restores priority order after
//! every dispatch pass.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Unit`, `UnitClass`, `RainProbabilities`, `RainProcess`
//! - **`dispatching`**: Priority rules and the `RuleEngine` comparator
//! - **`registry`**: Priority-ordered, index-stable unit arena
//! - **`generation`**: Generation band and the locked aggregate ledger
//! - **`scheduler`**: Greedy and window-search dispatch, fleet KPIs
//! - **`handshake`**: Strict dispatch/sort alternation
//! - **`context`**: Shared state handed to every task
//! - **`actors`**: Unit actors, re-ranker and coordinator tasks
//! - **`simulation`**: Start, run and stop a configured fleet
//! - **`config`** / **`validation`**: Startup configuration and its checks
//!
//! # Example
//!
//! ```no_run
//! use hydro_dispatch::config::{FleetConfig, UnitCounts};
//! use hydro_dispatch::models::RainProbabilities;
//! use hydro_dispatch::simulation::Simulation;
//!
//! # async fn demo() -> Result<(), hydro_dispatch::FleetError> {
//! let config = FleetConfig::new(RainProbabilities::new(0.2, 0.3, 0.5), UnitCounts::new(7, 2, 1));
//! let sim = Simulation::new(config)?;
//! let stop = sim.stop_handle();
//! tokio::spawn(async move {
//!     tokio::time::sleep(std::time::Duration::from_secs(10)).await;
//!     stop.stop();
//! });
//! let summary = sim.run().await?;
//! println!("{} dispatch passes", summary.stats.dispatch_passes);
//! # Ok(())
//! # }
//! ```

pub mod actors;
pub mod config;
pub mod context;
pub mod dispatching;
pub mod error;
pub mod generation;
pub mod handshake;
pub mod logging;
pub mod models;
pub mod random;
pub mod registry;
pub mod scheduler;
pub mod simulation;
pub mod validation;

pub use error::FleetError;
