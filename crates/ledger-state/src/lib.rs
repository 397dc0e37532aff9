//! # ledger-state
//!
//! The deterministic state machine of the document ledger.
//!
//! This crate provides:
//! - [`Executor`]: validates signed, sequenced transactions and applies
//!   them through a copy-on-write cache with commit/rollback semantics
//! - The query layer: typed point/range/membership queries against the
//!   committed store
//! - [`Response`] and [`Code`]: the structured result surface callers
//!   branch on
//!
//! ## Architecture
//!
//! A transaction moves through: input validation, account resolution,
//! sequence and signature checks, then either stops (validation-only) or
//! applies a type-specific transition against a fresh [`KvCache`] over the
//! store. Success flushes the cache; failure discards it and restores the
//! pre-transition account snapshot. A replicated log would call
//! [`Executor::execute`] for each entry and [`Executor::commit`] per
//! round; queries bypass the cache entirely.
//!
//! [`KvCache`]: ledger_storage::KvCache

mod error;
mod executor;
mod query;
mod response;

pub use error::{StateError, StateResult};
pub use executor::Executor;
pub use query::{
    QUERY_CATEGORIES, QUERY_CHAIN_ID, QUERY_INDEX, QUERY_KEY, QUERY_SIZE,
};
pub use response::{Code, Response};
