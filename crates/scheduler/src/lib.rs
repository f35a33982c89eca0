// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dashmsg-scheduler: the durable background poller (§4.E). Claims due
//! `ScheduledJob` rows in batches, invokes `Engine::execute_node` for each,
//! and settles the job's terminal status — independent of the engine's own
//! transaction, because the claim step must be visible to a competing
//! poller before the execution step runs (see `dashmsg_store::Store`).

mod error;
mod tick;

pub use error::SchedulerError;
pub use tick::TickSummary;

use dashmsg_core::Clock;
use dashmsg_engine::Engine;
use dashmsg_store::Store;
use std::time::Duration;

/// Jobs claimed per tick. Fixed rather than configurable: the tick interval
/// is the tunable the host cares about, and a 50-row batch keeps a single
/// tick's worst case bounded regardless of interval.
const CLAIM_BATCH_SIZE: i64 = 50;

pub struct Scheduler<S, C>
where
    S: Store,
    C: Clock,
{
    engine: Engine<S, C>,
    store: S,
    clock: C,
    tick_interval: Duration,
}

impl<S, C> Scheduler<S, C>
where
    S: Store + Clone,
    C: Clock,
{
    pub fn new(store: S, clock: C, tick_interval: Duration) -> Self {
        let engine = Engine::new(store.clone(), clock.clone());
        Self { engine, store, clock, tick_interval }
    }

    /// Runs the poll loop forever, sleeping `tick_interval` between ticks.
    /// Intended for the daemon binary; tests drive `tick()` directly instead
    /// so they never depend on wall-clock sleep.
    pub async fn run(&self) -> ! {
        loop {
            if let Err(err) = self.tick().await {
                tracing::error!(error = %err, "scheduler tick failed");
            }
            tokio::time::sleep(self.tick_interval).await;
        }
    }
}
