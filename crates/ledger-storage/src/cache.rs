//! Copy-on-write overlay cache.

use crate::{StorageError, StorageResult, Store};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// An in-memory overlay that buffers writes against a [`Store`].
///
/// The backing store is never touched until [`sync`](KvCache::sync).
/// Entries keep insertion/most-recent-update order: updating an existing
/// key relocates it to the tail, so a flush replays writes in last-write
/// order. Reads fall through to the store on a miss and memoize the value
/// into the overlay (read-through), so a repeated `get` before `sync` is
/// served locally.
///
/// Multiple independent caches may wrap the same store concurrently; they
/// share no overlay state, and at most one is flushed per accepted
/// transaction. An empty value buffered here clears the key on flush, per
/// the [`Store`] contract.
pub struct KvCache {
    store: Arc<dyn Store>,
    overlay: IndexMap<Vec<u8>, Vec<u8>>,
}

impl KvCache {
    /// Create an empty overlay over a store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            overlay: IndexMap::new(),
        }
    }

    /// Get a value, checking the overlay first and memoizing store reads.
    ///
    /// Returns `None` for keys absent from both; the miss itself is also
    /// memoized (as an empty entry, which flushes as a no-op clear).
    pub fn get(&mut self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        if let Some(value) = self.overlay.get(key) {
            return Ok(if value.is_empty() {
                None
            } else {
                Some(value.clone())
            });
        }

        let value = self.store.get(key)?.unwrap_or_default();
        trace!(key = %hex::encode(key), hit = !value.is_empty(), "cache read-through");
        let result = if value.is_empty() {
            None
        } else {
            Some(value.clone())
        };
        self.overlay.insert(key.to_vec(), value);
        Ok(result)
    }

    /// Buffer a write. A new key appends at the tail; an existing key is
    /// updated and relocated to the tail so the final value flushes last.
    pub fn set(&mut self, key: &[u8], value: &[u8]) {
        // shift_remove preserves the order of the remaining entries, so
        // reinsertion lands at the tail.
        self.overlay.shift_remove(key);
        self.overlay.insert(key.to_vec(), value.to_vec());
    }

    /// Number of overlay entries (including memoized reads).
    pub fn len(&self) -> usize {
        self.overlay.len()
    }

    /// Whether the overlay is empty.
    pub fn is_empty(&self) -> bool {
        self.overlay.is_empty()
    }

    /// Inspect an overlay entry without touching the backing store.
    pub fn overlay_get(&self, key: &[u8]) -> Option<&[u8]> {
        self.overlay.get(key).map(Vec::as_slice)
    }

    /// Flush the overlay into the backing store, head to tail, one
    /// `Store::set` per entry, then reset the overlay.
    ///
    /// Aborts on the first store error: remaining entries are discarded
    /// and the error reports how far the flush got. Callers treat that as
    /// an internal failure; there is no partial-retry path.
    pub fn sync(&mut self) -> StorageResult<()> {
        let total = self.overlay.len();
        for (applied, (key, value)) in self.overlay.iter().enumerate() {
            if let Err(e) = self.store.set(key, value) {
                self.overlay.clear();
                return Err(StorageError::SyncAborted {
                    applied,
                    total,
                    source: Box::new(e),
                });
            }
        }
        debug!(entries = total, "cache synced to store");
        self.overlay.clear();
        Ok(())
    }
}
