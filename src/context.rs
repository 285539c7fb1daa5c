//! Shared fleet context.
//!
//! One [`FleetContext`] is built at startup and handed to every task as an
//! `Arc`. It bundles:
//!
//! - the registry, behind a mutex held for the whole of any pass
//! - the generation ledger (its own lock; always taken after the registry)
//! - the dispatcher configuration and rain probabilities
//! - the stop token, the dispatch-request signal and the handshake
//! - pass counters and the last dispatch report

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::generation::{GenerationBand, GenerationLedger};
use crate::handshake::Handshake;
use crate::models::RainProbabilities;
use crate::registry::Registry;
use crate::scheduler::{DispatchReport, DispatchStrategy, Dispatcher, FleetKpi};

/// Counters updated as the simulation runs.
#[derive(Debug, Default)]
pub struct FleetStats {
    dispatch_passes: AtomicU64,
    fallback_passes: AtomicU64,
    infeasible_passes: AtomicU64,
    resorts: AtomicU64,
    dispatch_requests: AtomicU64,
}

/// Copy of [`FleetStats`] at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Completed dispatch passes.
    pub dispatch_passes: u64,
    /// Passes that needed the window search.
    pub fallback_passes: u64,
    /// Passes that ended outside the band.
    pub infeasible_passes: u64,
    /// Completed re-sorts.
    pub resorts: u64,
    /// Dispatch requests raised by unit actors.
    pub dispatch_requests: u64,
}

impl FleetStats {
    fn record_dispatch(&self, report: &DispatchReport) {
        self.dispatch_passes.fetch_add(1, Ordering::Relaxed);
        if report.strategy == DispatchStrategy::Fallback {
            self.fallback_passes.fetch_add(1, Ordering::Relaxed);
        }
        if !report.feasible {
            self.infeasible_passes.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Current counter values.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            dispatch_passes: self.dispatch_passes.load(Ordering::Relaxed),
            fallback_passes: self.fallback_passes.load(Ordering::Relaxed),
            infeasible_passes: self.infeasible_passes.load(Ordering::Relaxed),
            resorts: self.resorts.load(Ordering::Relaxed),
            dispatch_requests: self.dispatch_requests.load(Ordering::Relaxed),
        }
    }
}

/// State shared by the coordinator, the re-ranker and the unit actors.
#[derive(Debug)]
pub struct FleetContext {
    registry: Mutex<Registry>,
    ledger: GenerationLedger,
    dispatcher: Dispatcher,
    probabilities: RainProbabilities,
    shutdown: CancellationToken,
    dispatch_signal: Notify,
    handshake: Handshake,
    stats: FleetStats,
    last_report: Mutex<Option<DispatchReport>>,
}

impl FleetContext {
    /// Creates a context around an already built registry.
    ///
    /// No validation happens here; [`Simulation::new`](crate::simulation::Simulation::new)
    /// validates the configuration first.
    pub fn new(registry: Registry, band: GenerationBand, probabilities: RainProbabilities) -> Self {
        Self {
            registry: Mutex::new(registry),
            ledger: GenerationLedger::new(),
            dispatcher: Dispatcher::new(band),
            probabilities,
            shutdown: CancellationToken::new(),
            dispatch_signal: Notify::new(),
            handshake: Handshake::new(),
            stats: FleetStats::default(),
            last_report: Mutex::new(None),
        }
    }

    /// Locks the registry. The guard releases on drop.
    pub fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock()
    }

    /// Aggregate generation ledger.
    pub fn ledger(&self) -> &GenerationLedger {
        &self.ledger
    }

    /// Generation band.
    pub fn band(&self) -> GenerationBand {
        self.dispatcher.band()
    }

    /// Rain outcome probabilities.
    pub fn probabilities(&self) -> &RainProbabilities {
        &self.probabilities
    }

    /// Dispatch/sort handshake.
    pub fn handshake(&self) -> &Handshake {
        &self.handshake
    }

    /// Pass counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Report of the most recent dispatch pass.
    pub fn last_report(&self) -> Option<DispatchReport> {
        *self.last_report.lock()
    }

    /// Stop token observed by every task.
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Requests shutdown. Idempotent.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    /// Whether shutdown was requested.
    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Asks the coordinator for a dispatch pass.
    ///
    /// Requests raised while one is already pending collapse into one.
    pub fn request_dispatch(&self) {
        self.stats.dispatch_requests.fetch_add(1, Ordering::Relaxed);
        self.dispatch_signal.notify_one();
    }

    /// Waits for the next dispatch request.
    pub async fn dispatch_requested(&self) {
        self.dispatch_signal.notified().await;
    }

    /// Runs one dispatch pass with the registry locked throughout.
    ///
    /// Does not touch the handshake; see
    /// [`Coordinator::dispatch_cycle`](crate::actors::Coordinator::dispatch_cycle).
    pub fn run_dispatch_pass(&self) -> DispatchReport {
        let report = {
            let mut registry = self.registry.lock();
            self.dispatcher.dispatch(&mut registry, &self.ledger)
        };

        self.stats.record_dispatch(&report);
        *self.last_report.lock() = Some(report);

        if report.feasible {
            info!(
                strategy = ?report.strategy,
                total = report.total,
                active = report.active_units,
                "Dispatch pass complete"
            );
        } else {
            warn!(
                strategy = ?report.strategy,
                total = report.total,
                active = report.active_units,
                min = self.band().min,
                max = self.band().max,
                "Dispatch pass ended outside the generation band"
            );
        }
        report
    }

    /// Re-sorts the registry with the lock held throughout.
    pub fn run_resort(&self) {
        {
            let mut registry = self.registry.lock();
            registry.resort();
        }
        self.stats.resorts.fetch_add(1, Ordering::Relaxed);
        debug!("Registry re-sorted");
    }

    /// Consistent KPI snapshot taken under the registry lock.
    pub fn kpi(&self) -> FleetKpi {
        let registry = self.registry.lock();
        FleetKpi::capture(&registry, &self.ledger, self.band())
    }
}
