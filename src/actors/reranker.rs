//! Reranker: restores priority order after each dispatch pass.

use std::sync::Arc;

use tracing::{debug, info};

use crate::context::FleetContext;
use crate::error::FleetError;
use crate::handshake::Phase;

/// Background task that re-sorts the registry whenever the handshake
/// reaches [`Phase::Sorting`], then hands control back to the coordinator.
#[derive(Debug)]
pub struct Reranker {
    ctx: Arc<FleetContext>,
}

impl Reranker {
    /// Creates a re-ranker over the shared context.
    pub fn new(ctx: Arc<FleetContext>) -> Self {
        Self { ctx }
    }

    /// Runs one sort pass if the handshake is in [`Phase::Sorting`].
    pub fn sort_cycle(&self) -> Result<(), FleetError> {
        let handshake = self.ctx.handshake();
        if handshake.phase() != Phase::Sorting {
            return Err(FleetError::Handshake {
                expected: Phase::Sorting,
                found: handshake.phase(),
            });
        }
        self.ctx.run_resort();
        handshake.finish_sort()
    }

    /// Sorts after every dispatch pass until the stop token is cancelled.
    pub async fn run(self) -> Result<(), FleetError> {
        let shutdown = self.ctx.shutdown_token().clone();

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    break;
                }

                reached = self.ctx.handshake().wait_for(Phase::Sorting) => {
                    reached?;
                    self.sort_cycle()?;
                    debug!(resorts = self.ctx.stats().resorts, "Sort pass complete");
                }
            }
        }

        info!("Reranker stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnitCounts;
    use crate::generation::GenerationBand;
    use crate::models::{RainProbabilities, UnitId};
    use crate::registry::Registry;
    use std::time::Duration;

    fn context() -> Arc<FleetContext> {
        Arc::new(FleetContext::new(
            Registry::from_counts(&UnitCounts::new(1, 1, 1)).unwrap(),
            GenerationBand::default(),
            RainProbabilities::default(),
        ))
    }

    #[test]
    fn test_sort_cycle_requires_sorting_phase() {
        let reranker = Reranker::new(context());
        assert!(reranker.sort_cycle().is_err());
        assert_eq!(reranker.ctx.stats().resorts, 0);
    }

    #[test]
    fn test_sort_cycle_reorders_and_hands_back() {
        let ctx = context();
        // Capacity outranks fill level.
        ctx.registry().get_mut(UnitId(0)).unwrap().set_water_level(10.0);
        ctx.handshake().begin_dispatch().unwrap();
        ctx.handshake().finish_dispatch().unwrap();

        let reranker = Reranker::new(Arc::clone(&ctx));
        reranker.sort_cycle().unwrap();

        assert_eq!(ctx.handshake().phase(), Phase::AwaitingDispatch);
        assert_eq!(ctx.stats().resorts, 1);
        assert!(ctx.registry().is_sorted());
        assert_eq!(ctx.registry().order()[0], UnitId(0));
    }

    #[tokio::test]
    async fn test_run_sorts_after_dispatch_and_stops() {
        let ctx = context();
        let task = tokio::spawn(Reranker::new(Arc::clone(&ctx)).run());

        ctx.handshake().begin_dispatch().unwrap();
        ctx.handshake().finish_dispatch().unwrap();
        ctx.handshake().wait_for(Phase::AwaitingDispatch).await.unwrap();
        assert_eq!(ctx.stats().resorts, 1);

        ctx.stop();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
    }
}
