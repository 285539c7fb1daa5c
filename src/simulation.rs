//! Simulation lifecycle: validate, build, run, stop.
//!
//! [`Simulation::new`] surfaces every configuration problem before any task
//! exists. [`Simulation::run`] performs the startup dispatch pass, spawns
//! the re-ranker and one actor per unit, then drives the coordinator until
//! a [`StopHandle`] fires. All tasks are joined before it returns.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::actors::{Coordinator, Reranker, UnitActor};
use crate::config::FleetConfig;
use crate::context::{FleetContext, StatsSnapshot};
use crate::error::FleetError;
use crate::random::{RngSource, UniformSource};
use crate::registry::Registry;
use crate::scheduler::{DispatchReport, FleetKpi};
use crate::validation::validate_config;

/// Cloneable handle that stops a running simulation.
#[derive(Debug, Clone)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    /// Signals every task to exit. Idempotent.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Whether a stop was signalled.
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Final state reported when a simulation stops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSummary {
    /// Counters at shutdown.
    pub stats: StatsSnapshot,
    /// Fleet indicators after every task was joined.
    pub kpi: FleetKpi,
    /// Report of the final dispatch pass.
    pub last_report: Option<DispatchReport>,
}

/// A validated, ready-to-run fleet simulation.
#[derive(Debug)]
pub struct Simulation {
    ctx: Arc<FleetContext>,
    tick_interval: Duration,
    seed: Option<u64>,
}

impl Simulation {
    /// Validates `config` and builds the fleet.
    ///
    /// # Errors
    ///
    /// [`FleetError::InvalidConfig`] with every validation failure, or
    /// [`FleetError::Allocation`] if the registry cannot be allocated.
    pub fn new(config: FleetConfig) -> Result<Self, FleetError> {
        validate_config(&config).map_err(FleetError::InvalidConfig)?;

        let registry = Registry::from_counts(&config.units)?;
        let ctx = FleetContext::new(registry, config.band, config.probabilities);

        Ok(Self {
            ctx: Arc::new(ctx),
            tick_interval: config.tick_interval(),
            seed: config.seed,
        })
    }

    /// Shared context, for inspection while running.
    pub fn context(&self) -> Arc<FleetContext> {
        Arc::clone(&self.ctx)
    }

    /// Handle that stops this simulation.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            token: self.ctx.shutdown_token().clone(),
        }
    }

    /// Runs until stopped and returns the final summary.
    ///
    /// Stopping before `run` is called still performs the startup dispatch
    /// pass, then returns immediately.
    pub async fn run(self) -> Result<SimulationSummary, FleetError> {
        let ctx = self.ctx;
        let coordinator = Coordinator::new(Arc::clone(&ctx));

        info!(
            units = ctx.registry().len(),
            tick_ms = self.tick_interval.as_millis() as u64,
            "Fleet simulation starting"
        );
        coordinator.dispatch_cycle()?;

        let reranker = tokio::spawn(Reranker::new(Arc::clone(&ctx)).run());

        let ids: Vec<_> = ctx.registry().order().to_vec();
        let actors: Vec<JoinHandle<()>> = ids
            .into_iter()
            .map(|id| {
                let source: Box<dyn UniformSource> = match self.seed {
                    Some(seed) => Box::new(RngSource::seeded(seed.wrapping_add(id.index() as u64))),
                    None => Box::new(RngSource::from_os_rng()),
                };
                tokio::spawn(UnitActor::new(id, source).run(Arc::clone(&ctx), self.tick_interval))
            })
            .collect();

        let outcome = coordinator.run().await;
        if let Err(e) = &outcome {
            warn!(error = %e, "Coordinator failed, stopping fleet");
        }
        ctx.stop();

        let joined = join_tasks(actors, reranker).await;
        outcome?;
        joined?;

        let summary = SimulationSummary {
            stats: ctx.stats(),
            kpi: ctx.kpi(),
            last_report: ctx.last_report(),
        };
        info!(
            passes = summary.stats.dispatch_passes,
            fallbacks = summary.stats.fallback_passes,
            total = summary.kpi.total_generation,
            "Fleet simulation stopped"
        );
        Ok(summary)
    }
}

/// Joins every task, then returns the first failure.
///
/// A panicking actor does not cut the join short; the remaining handles are
/// still awaited.
async fn join_tasks(
    actors: Vec<JoinHandle<()>>,
    reranker: JoinHandle<Result<(), FleetError>>,
) -> Result<(), FleetError> {
    let mut first_error: Option<FleetError> = None;
    for actor in actors {
        if let Err(e) = actor.await {
            warn!(error = %e, "Unit actor failed");
            first_error.get_or_insert(e.into());
        }
    }
    match reranker.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            first_error.get_or_insert(e);
        }
        Err(e) => {
            first_error.get_or_insert(e.into());
        }
    }
    first_error.map_or(Ok(()), Err)
}
