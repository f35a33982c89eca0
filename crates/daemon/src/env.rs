// SPDX-License-Identifier: MIT

//! Centralized environment variable access for the daemon binary.
//!
//! Kept minimal per the host configuration surface: a database connection
//! string and one scheduler tunable. Everything else about a protocol is
//! seeded data, not daemon configuration.

use std::time::Duration;

/// `SCHEDULER_POLL_INTERVAL_SECONDS`, default 1, floor 1.
pub fn scheduler_poll_interval() -> Duration {
    let seconds = std::env::var("SCHEDULER_POLL_INTERVAL_SECONDS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(1)
        .max(1);
    Duration::from_secs(seconds)
}

pub fn database_url() -> Result<String, DatabaseUrlError> {
    std::env::var("DATABASE_URL").map_err(|_| DatabaseUrlError::Missing)
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseUrlError {
    #[error("DATABASE_URL is not set")]
    Missing,
}
