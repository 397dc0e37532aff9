//! # ledger-storage
//!
//! Storage layer for the document ledger.
//!
//! This crate provides:
//! - The [`Store`] trait: an ordered, content-hashable key-value backend
//! - [`MemoryStore`]: a BTreeMap-backed store for tests and validation
//! - [`Database`]: a RocksDB-backed persistent store
//! - [`KvCache`]: a copy-on-write overlay that buffers writes against a
//!   store and flushes them in a deterministic order
//!
//! ## Semantics
//!
//! Setting an empty value clears a key: the entry is removed outright, not
//! tombstoned, and subsequent `get`s return `None`. The content hash is a
//! Merkle fold (Blake2b256) over the sorted `(key, value)` pairs, so two
//! stores with the same contents hash identically regardless of backend.

mod cache;
mod database;
mod error;
mod hash;
mod memory;

pub use cache::KvCache;
pub use database::{ColumnFamily, Database, CHAIN_ID_KEY};
pub use error::{StorageError, StorageResult};
pub use hash::merkle_root;
pub use memory::MemoryStore;

/// An ordered key-value store with a whole-store content hash.
///
/// This abstracts the backend so the execution engine can run against
/// RocksDB in production and an in-memory map in tests.
pub trait Store: Send + Sync {
    /// Get a value by key. Cleared and absent keys both read as `None`.
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Set a key to a value. An empty value clears the key.
    fn set(&self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Number of live entries.
    fn size(&self) -> StorageResult<u64>;

    /// The key at the given ordinal position in key order.
    fn key_at(&self, index: u64) -> StorageResult<Option<Vec<u8>>>;

    /// Iterate over all entries in key order.
    fn iter(&self) -> StorageResult<Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)> + '_>>;

    /// Content hash of the full store (Merkle fold over sorted entries).
    fn root_hash(&self) -> StorageResult<Vec<u8>>;
}
