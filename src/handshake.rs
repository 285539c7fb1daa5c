//! Dispatch/sort handshake.
//!
//! The coordinator and the re-ranker take turns on the registry:
//!
//! ```text
//! AwaitingDispatch ──begin_dispatch──▶ Dispatching
//!        ▲                                  │
//!   finish_sort                       finish_dispatch
//!        │                                  ▼
//!        └───────────────────────────── Sorting
//! ```
//!
//! Each transition only succeeds from its expected phase, so a sort never
//! overlaps a dispatch pass and the next dispatch waits for the sort.
//! Waiters observe phase changes through a `tokio::sync::watch` channel.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::FleetError;

/// Current phase of the dispatch/sort cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Idle; the next dispatch pass may start.
    AwaitingDispatch,
    /// A dispatch pass owns the registry.
    Dispatching,
    /// The dispatch pass finished; a sort pass may run.
    Sorting,
}

/// Strictly alternating dispatch/sort protocol.
#[derive(Debug)]
pub struct Handshake {
    phase: watch::Sender<Phase>,
}

impl Handshake {
    /// Creates a handshake in [`Phase::AwaitingDispatch`].
    pub fn new() -> Self {
        let (phase, _) = watch::channel(Phase::AwaitingDispatch);
        Self { phase }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// `AwaitingDispatch → Dispatching`.
    pub fn begin_dispatch(&self) -> Result<(), FleetError> {
        self.transition(Phase::AwaitingDispatch, Phase::Dispatching)
    }

    /// `Dispatching → Sorting`.
    pub fn finish_dispatch(&self) -> Result<(), FleetError> {
        self.transition(Phase::Dispatching, Phase::Sorting)
    }

    /// `Sorting → AwaitingDispatch`.
    pub fn finish_sort(&self) -> Result<(), FleetError> {
        self.transition(Phase::Sorting, Phase::AwaitingDispatch)
    }

    fn transition(&self, from: Phase, to: Phase) -> Result<(), FleetError> {
        let mut found = from;
        let moved = self.phase.send_if_modified(|phase| {
            found = *phase;
            if *phase == from {
                *phase = to;
                true
            } else {
                false
            }
        });

        if moved {
            Ok(())
        } else {
            Err(FleetError::Handshake {
                expected: from,
                found,
            })
        }
    }

    /// Waits until the handshake reaches `phase`.
    ///
    /// Returns immediately if it is already there.
    pub async fn wait_for(&self, phase: Phase) -> Result<(), FleetError> {
        let mut rx = self.phase.subscribe();
        let reached = rx.wait_for(|current| *current == phase).await.is_ok();
        if reached {
            Ok(())
        } else {
            Err(FleetError::HandshakeClosed)
        }
    }
}

impl Default for Handshake {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_full_cycle() {
        let hs = Handshake::new();
        assert_eq!(hs.phase(), Phase::AwaitingDispatch);
        hs.begin_dispatch().unwrap();
        assert_eq!(hs.phase(), Phase::Dispatching);
        hs.finish_dispatch().unwrap();
        assert_eq!(hs.phase(), Phase::Sorting);
        hs.finish_sort().unwrap();
        assert_eq!(hs.phase(), Phase::AwaitingDispatch);
    }

    #[test]
    fn test_out_of_turn_transitions_fail() {
        let hs = Handshake::new();
        match hs.finish_sort() {
            Err(FleetError::Handshake { expected, found }) => {
                assert_eq!(expected, Phase::Sorting);
                assert_eq!(found, Phase::AwaitingDispatch);
            }
            other => panic!("unexpected: {other:?}"),
        }

        hs.begin_dispatch().unwrap();
        assert!(hs.begin_dispatch().is_err());
        assert!(hs.finish_sort().is_err());
        assert_eq!(hs.phase(), Phase::Dispatching);
    }

    #[tokio::test]
    async fn test_wait_for_current_phase_returns_immediately() {
        let hs = Handshake::new();
        hs.wait_for(Phase::AwaitingDispatch).await.unwrap();
    }

    #[tokio::test]
    async fn test_sorter_wakes_after_dispatch() {
        let hs = Arc::new(Handshake::new());
        let sorter = {
            let hs = Arc::clone(&hs);
            tokio::spawn(async move {
                hs.wait_for(Phase::Sorting).await.unwrap();
                hs.finish_sort().unwrap();
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(hs.phase(), Phase::AwaitingDispatch);

        hs.begin_dispatch().unwrap();
        hs.finish_dispatch().unwrap();
        hs.wait_for(Phase::AwaitingDispatch).await.unwrap();
        sorter.await.unwrap();
    }
}
