//! In-memory store for tests and validation-only paths.

use crate::{merkle_root, StorageResult, Store};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// A BTreeMap-backed [`Store`].
///
/// Interior-mutable and cheap to share behind an `Arc`; entries stay in
/// key order, so ordinal lookups and the content hash fall out of the map
/// directly.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        let mut entries = self.entries.write();
        if value.is_empty() {
            entries.remove(key);
        } else {
            entries.insert(key.to_vec(), value.to_vec());
        }
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.entries.read().len() as u64)
    }

    fn key_at(&self, index: u64) -> StorageResult<Option<Vec<u8>>> {
        Ok(self
            .entries
            .read()
            .keys()
            .nth(index as usize)
            .cloned())
    }

    fn iter(&self) -> StorageResult<Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)> + '_>> {
        let collected: Vec<_> = self
            .entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(Box::new(collected.into_iter()))
    }

    fn root_hash(&self) -> StorageResult<Vec<u8>> {
        Ok(merkle_root(self.iter()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get() {
        let store = MemoryStore::new();
        store.set(b"k1", b"v1").unwrap();
        assert_eq!(store.get(b"k1").unwrap(), Some(b"v1".to_vec()));
        assert_eq!(store.get(b"missing").unwrap(), None);
    }

    #[test]
    fn test_empty_value_clears_key() {
        let store = MemoryStore::new();
        store.set(b"k1", b"v1").unwrap();
        store.set(b"k1", b"").unwrap();
        assert_eq!(store.get(b"k1").unwrap(), None);
        assert_eq!(store.size().unwrap(), 0);
    }

    #[test]
    fn test_key_order_and_ordinals() {
        let store = MemoryStore::new();
        store.set(b"b", b"2").unwrap();
        store.set(b"a", b"1").unwrap();
        store.set(b"c", b"3").unwrap();

        assert_eq!(store.size().unwrap(), 3);
        assert_eq!(store.key_at(0).unwrap(), Some(b"a".to_vec()));
        assert_eq!(store.key_at(2).unwrap(), Some(b"c".to_vec()));
        assert_eq!(store.key_at(3).unwrap(), None);
    }

    #[test]
    fn test_root_hash_tracks_contents() {
        let store = MemoryStore::new();
        let empty = store.root_hash().unwrap();
        store.set(b"k1", b"v1").unwrap();
        let one = store.root_hash().unwrap();
        assert_ne!(empty, one);

        store.set(b"k1", b"").unwrap();
        assert_eq!(store.root_hash().unwrap(), empty);
    }
}
