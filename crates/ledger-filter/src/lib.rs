//! # ledger-filter
//!
//! Probabilistic set-membership filters for the document ledger.
//!
//! This crate provides:
//! - [`CountingFilter`]: a counting Bloom filter sized from an expected
//!   capacity and false-positive rate
//! - [`FilterSet`]: one filter per named category, created lazily
//!
//! Filters are an index, not a source of truth: membership tests have a
//! bounded false-positive rate and no false negatives, and the execution
//! engine treats filter failures as log-and-continue.

mod bloom;
mod error;
mod set;

pub use bloom::{CountingFilter, FilterConfig};
pub use error::{FilterError, FilterResult};
pub use set::FilterSet;
