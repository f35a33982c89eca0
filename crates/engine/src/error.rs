// SPDX-License-Identifier: MIT

//! Errors the engine surfaces to its host. Preconditions that mean "the flow
//! said don't fire" are modeled as `Ok(None)`, never as an error variant —
//! see [`crate::Engine::execute_node`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] dashmsg_store::StoreError),
}
