// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("store error: {0}")]
    Store(#[from] dashmsg_store::StoreError),

    #[error("engine error: {0}")]
    Engine(#[from] dashmsg_engine::EngineError),
}
