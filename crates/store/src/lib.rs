// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dashmsg-store: typed persistence for the flow model, plus the scheduled
//! jobs table the scheduler polls.

mod error;
mod memory;
mod postgres;
mod traits;

pub use error::StoreError;
pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use traits::{ActivationFilter, Store, StoreTx};
