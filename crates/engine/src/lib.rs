// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dashmsg-engine: the stateful operations of the protocol execution core.
//!
//! `Engine` is generic over the store and clock so that production code runs
//! against `PgStore`/`SystemClock` and tests run against
//! `InMemoryStore`/`FakeClock` without a trait object at the call site. Every
//! public operation opens exactly one `StoreTx`, does its reads and writes
//! through it, and commits or rolls back once — see `dashmsg_store::StoreTx`.

mod enroll;
mod error;
mod execute_node;
mod keyword_dispatch;
mod poll_answer;
mod process_inbound;
mod scheduling;
mod timeline;

pub use error::EngineError;
pub use keyword_dispatch::{resolve_stage1, Stage1Action};
pub use poll_answer::accepted_answers;
pub use timeline::TimelineEntry;

use dashmsg_core::Clock;
use dashmsg_store::Store;

/// The protocol execution core's single stateful entry point.
///
/// Holds the store and clock by value: both are cheap handles (`PgPool`-
/// backed or `Arc`-backed) designed to be cloned freely, matching how the
/// teacher's own `Runtime<A, N, C>` is constructed per-connection rather
/// than behind a shared lock.
pub struct Engine<S, C>
where
    S: Store,
    C: Clock,
{
    store: S,
    clock: C,
}

impl<S, C> Engine<S, C>
where
    S: Store,
    C: Clock,
{
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
