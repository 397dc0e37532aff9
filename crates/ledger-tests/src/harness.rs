//! Test harness for integration tests.
//!
//! Provides utilities for creating test databases and wired-up executors.

use ledger_filter::{FilterConfig, FilterSet};
use ledger_state::Executor;
use ledger_storage::{Database, MemoryStore, Store};
use std::sync::Arc;
use tempfile::TempDir;

/// Chain id used throughout the integration tests.
pub const TEST_CHAIN_ID: &str = "civic-test";

/// Test database wrapper that cleans up on drop.
pub struct TestDatabase {
    db: Database,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new test database in a temporary directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db = Database::open(temp_dir.path()).expect("Failed to open database");
        Self {
            db,
            _temp_dir: temp_dir,
        }
    }

    /// Get a reference to the database.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Get a clone of the database (shares the underlying connection).
    pub fn db_clone(&self) -> Database {
        self.db.clone()
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// A wired-up executor plus handles to its collaborators.
pub struct TestContext {
    /// The shared store behind the executor.
    pub store: Arc<dyn Store>,
    /// The shared filter set behind the executor.
    pub filters: Arc<FilterSet>,
    /// The executor under test.
    pub executor: Executor,
}

impl TestContext {
    /// In-memory context: fast, no disk.
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// Build a context over an arbitrary store.
    pub fn with_store(store: Arc<dyn Store>) -> Self {
        let filters = Arc::new(
            FilterSet::new(FilterConfig {
                capacity: 1_000,
                fp_rate: 0.01,
            })
            .expect("valid filter config"),
        );
        let executor = Executor::new(Arc::clone(&store), Arc::clone(&filters), TEST_CHAIN_ID)
            .expect("valid executor config");
        Self {
            store,
            filters,
            executor,
        }
    }
}
