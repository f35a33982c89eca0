// SPDX-License-Identifier: MIT

//! dashmsg-daemon: the background process that runs the scheduler loop
//! against a live Postgres-backed store. The HTTP API surface that calls
//! `enroll_participant`/`process_inbound` on the same store is an external
//! collaborator, not part of this crate.

pub mod env;

use dashmsg_core::SystemClock;
use dashmsg_scheduler::Scheduler;
use dashmsg_store::{PgStore, StoreError};
use sqlx::PgPool;

pub async fn connect(database_url: &str) -> Result<PgStore, StoreError> {
    let pool = PgPool::connect(database_url).await?;
    Ok(PgStore::new(pool))
}

pub fn install_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

pub fn scheduler(store: PgStore) -> Scheduler<PgStore, SystemClock> {
    Scheduler::new(store, SystemClock, env::scheduler_poll_interval())
}
