//! UnitActor: simulates one unit's reservoir.
//!
//! Each tick, with the registry locked:
//! 1. Advance the rain process and add its inflow.
//! 2. Drain [`DRAWDOWN_PER_TICK`] if the unit was generating.
//! 3. Spill [`DRAWDOWN_PER_TICK`] if the unit was idle and overfull.
//! 4. Deactivate the unit if its level left `[min, max]`.
//!
//! A dispatch is requested after the lock is released when the unit was
//! deactivated, or when an idle unit entered or left its band.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace};

use crate::context::FleetContext;
use crate::models::{RainProcess, UnitId};
use crate::random::UniformSource;

/// Water drawn per tick by a generating unit; also the spillage rate.
pub const DRAWDOWN_PER_TICK: f64 = 5.0;

/// What happened to the unit during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Rain inflow added this tick.
    pub inflow: f64,
    /// Water level after the tick.
    pub water_level: f64,
    /// Whether the unit is active after the tick.
    pub active: bool,
    /// Whether this tick deactivated the unit.
    pub deactivated: bool,
    /// Whether an idle, overfull unit spilled water.
    pub spilled: bool,
    /// Whether a dispatch request was raised.
    pub dispatch_requested: bool,
}

/// Per-unit simulation task.
pub struct UnitActor {
    id: UnitId,
    rain: RainProcess,
    source: Box<dyn UniformSource>,
    in_range: bool,
}

impl std::fmt::Debug for UnitActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitActor")
            .field("id", &self.id)
            .field("rain_ticks_left", &self.rain.remaining_ticks())
            .field("in_range", &self.in_range)
            .finish()
    }
}

impl UnitActor {
    /// Creates an actor for `id` drawing rain from `source`.
    ///
    /// Units start at their band midpoint, so the actor starts in range.
    pub fn new(id: UnitId, source: Box<dyn UniformSource>) -> Self {
        Self {
            id,
            rain: RainProcess::new(),
            source,
            in_range: true,
        }
    }

    /// The unit this actor drives.
    pub fn id(&self) -> UnitId {
        self.id
    }

    /// Advances the unit by one tick.
    ///
    /// Returns `None` if the id is not in the registry.
    pub fn tick(&mut self, ctx: &FleetContext) -> Option<TickOutcome> {
        let outcome = {
            let mut registry = ctx.registry();
            let unit = registry.get_mut(self.id)?;

            let was_active = unit.is_active();
            let inflow = self.rain.step(ctx.probabilities(), self.source.as_mut());
            unit.add_water(inflow);

            if was_active {
                unit.drain(DRAWDOWN_PER_TICK);
            }

            let spilled = !was_active && unit.is_overfull();
            if spilled {
                unit.drain(DRAWDOWN_PER_TICK);
            }

            let in_range = unit.is_within_range();
            let deactivated = !in_range && ctx.ledger().deactivate(unit);
            let crossed = in_range != self.in_range;
            self.in_range = in_range;

            TickOutcome {
                inflow,
                water_level: unit.water_level(),
                active: unit.is_active(),
                deactivated,
                spilled,
                dispatch_requested: deactivated || (!was_active && crossed),
            }
        };

        if outcome.deactivated {
            debug!(
                unit = %self.id,
                level = outcome.water_level,
                "Unit left its water band, deactivated"
            );
        }
        if outcome.dispatch_requested {
            ctx.request_dispatch();
        }
        Some(outcome)
    }

    /// Ticks every `interval` until the stop token is cancelled.
    pub async fn run(mut self, ctx: Arc<FleetContext>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip the first immediate tick
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;

                _ = ctx.shutdown_token().cancelled() => {
                    break;
                }

                _ = ticker.tick() => {
                    match self.tick(&ctx) {
                        Some(outcome) => trace!(
                            unit = %self.id,
                            level = outcome.water_level,
                            active = outcome.active,
                            inflow = outcome.inflow,
                            "Unit tick"
                        ),
                        None => break,
                    }
                }
            }
        }

        info!(unit = %self.id, "Unit actor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnitCounts;
    use crate::generation::GenerationBand;
    use crate::models::RainProbabilities;
    use crate::random::SequenceSource;
    use crate::registry::Registry;

    fn context(probabilities: RainProbabilities, counts: UnitCounts) -> FleetContext {
        FleetContext::new(
            Registry::from_counts(&counts).unwrap(),
            GenerationBand::default(),
            probabilities,
        )
    }

    fn dry() -> RainProbabilities {
        RainProbabilities::new(1.0, 0.0, 0.0)
    }

    fn actor(id: usize) -> UnitActor {
        UnitActor::new(UnitId(id), Box::new(SequenceSource::new(vec![0.5])))
    }

    fn activate(ctx: &FleetContext, id: usize) {
        let mut registry = ctx.registry();
        ctx.ledger().activate(registry.get_mut(UnitId(id)).unwrap());
    }

    #[test]
    fn test_active_unit_draws_down() {
        let ctx = context(dry(), UnitCounts::new(1, 0, 0));
        activate(&ctx, 0);
        let mut a = actor(0);

        let outcome = a.tick(&ctx).unwrap();
        assert!((outcome.water_level - 120.0).abs() < 1e-10);
        assert!(outcome.active);
        assert!(!outcome.dispatch_requested);
    }

    #[test]
    fn test_idle_unit_in_range_holds_level() {
        let ctx = context(dry(), UnitCounts::new(1, 0, 0));
        let mut a = actor(0);
        for _ in 0..5 {
            let outcome = a.tick(&ctx).unwrap();
            assert!((outcome.water_level - 125.0).abs() < 1e-10);
            assert!(!outcome.dispatch_requested);
        }
    }

    #[test]
    fn test_rain_applies_after_draw() {
        let ctx = context(RainProbabilities::new(0.0, 0.0, 1.0), UnitCounts::new(0, 0, 1));
        let mut a = actor(0);

        assert!(a.tick(&ctx).unwrap().inflow.abs() < 1e-10);
        let outcome = a.tick(&ctx).unwrap();
        assert!((outcome.inflow - 4.0).abs() < 1e-10);
        assert!((outcome.water_level - 34.0).abs() < 1e-10);
    }

    #[test]
    fn test_drained_unit_deactivates_and_requests_dispatch() {
        // H3 starts at 30 with min 10: four ticks reach 10, the fifth 5.
        let ctx = context(dry(), UnitCounts::new(0, 0, 1));
        activate(&ctx, 0);
        let mut a = actor(0);

        for _ in 0..4 {
            assert!(!a.tick(&ctx).unwrap().deactivated);
        }
        let outcome = a.tick(&ctx).unwrap();
        assert!(outcome.deactivated);
        assert!(!outcome.active);
        assert!(outcome.dispatch_requested);
        assert!(ctx.ledger().total().abs() < 1e-10);
        assert_eq!(ctx.stats().dispatch_requests, 1);
    }

    #[test]
    fn test_overflow_deactivates_active_unit() {
        let ctx = context(RainProbabilities::new(0.0, 0.0, 1.0), UnitCounts::new(0, 0, 1));
        ctx.registry().get_mut(UnitId(0)).unwrap().set_water_level(50.0);
        activate(&ctx, 0);
        let mut a = actor(0);

        // Draw tick adds no rain: 50 - 5 = 45.
        a.tick(&ctx).unwrap();
        ctx.registry().get_mut(UnitId(0)).unwrap().set_water_level(52.0);
        let outcome = a.tick(&ctx).unwrap();
        // 52 + 4 - 5 = 51 > 50
        assert!(outcome.deactivated);
        assert!(outcome.dispatch_requested);
        assert!(!outcome.spilled);
    }

    #[test]
    fn test_idle_overfull_unit_spills() {
        let ctx = context(dry(), UnitCounts::new(0, 1, 0));
        ctx.registry().get_mut(UnitId(0)).unwrap().set_water_level(112.0);
        let mut a = actor(0);

        let outcome = a.tick(&ctx).unwrap();
        assert!(outcome.spilled);
        assert!((outcome.water_level - 107.0).abs() < 1e-10);
        assert!(outcome.dispatch_requested, "leaving the band is a crossing");

        let outcome = a.tick(&ctx).unwrap();
        assert!((outcome.water_level - 102.0).abs() < 1e-10);
        assert!(!outcome.dispatch_requested);

        let outcome = a.tick(&ctx).unwrap();
        assert!((outcome.water_level - 97.0).abs() < 1e-10);
        assert!(outcome.dispatch_requested, "re-entering the band is a crossing");
        assert!(!outcome.active);
    }

    #[test]
    fn test_unknown_unit() {
        let ctx = context(dry(), UnitCounts::new(1, 0, 0));
        assert!(actor(5).tick(&ctx).is_none());
    }

    #[tokio::test]
    async fn test_run_exits_on_stop() {
        let ctx = Arc::new(context(dry(), UnitCounts::new(1, 0, 0)));
        let task = tokio::spawn(actor(0).run(Arc::clone(&ctx), Duration::from_millis(5)));
        tokio::time::sleep(Duration::from_millis(30)).await;
        ctx.stop();
        task.await.unwrap();
    }
}
