//! Coordinator: runs a dispatch pass for every dispatch request.

use std::sync::Arc;

use tracing::info;

use crate::context::FleetContext;
use crate::error::FleetError;
use crate::handshake::Phase;
use crate::scheduler::DispatchReport;

/// Waits for dispatch requests and runs dispatch passes, one per sort
/// cycle.
#[derive(Debug)]
pub struct Coordinator {
    ctx: Arc<FleetContext>,
}

impl Coordinator {
    /// Creates a coordinator over the shared context.
    pub fn new(ctx: Arc<FleetContext>) -> Self {
        Self { ctx }
    }

    /// Runs one dispatch pass under the handshake.
    ///
    /// Fails without touching the registry if the previous sort has not
    /// finished. On success the handshake is left in [`Phase::Sorting`].
    pub fn dispatch_cycle(&self) -> Result<DispatchReport, FleetError> {
        let handshake = self.ctx.handshake();
        handshake.begin_dispatch()?;
        let report = self.ctx.run_dispatch_pass();
        handshake.finish_dispatch()?;
        Ok(report)
    }

    /// Serves dispatch requests until the stop token is cancelled.
    ///
    /// Each request waits for the previous sort pass to finish first.
    pub async fn run(&self) -> Result<(), FleetError> {
        let shutdown = self.ctx.shutdown_token().clone();

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = self.ctx.dispatch_requested() => {}
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                ready = self.ctx.handshake().wait_for(Phase::AwaitingDispatch) => ready?,
            }

            self.dispatch_cycle()?;
        }

        info!(
            passes = self.ctx.stats().dispatch_passes,
            "Coordinator stopped"
        );
        Ok(())
    }
}
