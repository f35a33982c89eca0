// SPDX-License-Identifier: MIT

//! Entry point: connects to Postgres, runs migrations, and drives the
//! scheduler loop until the process is killed.

use dashmsg_daemon::env;
use dashmsg_store::Store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dashmsg_daemon::install_tracing();

    let database_url = env::database_url()?;
    let store = dashmsg_daemon::connect(&database_url).await?;
    store.migrate().await?;

    let reclaimed = store.reclaim_stale_running_jobs().await?;
    if reclaimed > 0 {
        tracing::warn!(reclaimed, "reclaimed jobs left Running by a prior instance");
    }

    let scheduler = dashmsg_daemon::scheduler(store);
    tracing::info!(interval_secs = ?env::scheduler_poll_interval(), "scheduler starting");
    scheduler.run().await
}
