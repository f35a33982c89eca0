// SPDX-License-Identifier: MIT

//! StoreError: the only error taxonomy the store surfaces upward. Any I/O
//! failure — a dropped connection, a constraint violation, a bad migration
//! state — collapses into `Io`; the scheduler rolls the job back to `Pending`
//! on `Io` and retries on the next tick.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Io(#[from] sqlx::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict claiming job {0}: already claimed by another poller")]
    ClaimLost(String),
}
