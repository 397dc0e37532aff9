//! # ledger-tests
//!
//! Integration tests for the document ledger.
//!
//! This crate provides comprehensive integration testing including:
//! - Scenario tests driving the executor end to end
//! - Storage tests for the RocksDB backend and the overlay cache
//! - Property-based tests for identifiers, caching, and filters

pub mod generators;
pub mod harness;



#[cfg(test)]
mod property_tests;

pub use generators::*;
pub use harness::*;
