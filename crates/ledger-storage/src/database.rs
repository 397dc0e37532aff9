//! RocksDB database implementation.

use crate::{merkle_root, StorageError, StorageResult, Store};
use rocksdb::{ColumnFamilyDescriptor, DBWithThreadMode, MultiThreaded, Options};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Column families for organizing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnFamily {
    /// Ledger state: accounts keyed by address, documents keyed by id.
    State,
    /// Chain metadata (chain id and similar).
    Metadata,
    /// Default column family (required by RocksDB).
    Default,
}

impl ColumnFamily {
    /// Get the string name of the column family.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnFamily::State => "state",
            ColumnFamily::Metadata => "metadata",
            ColumnFamily::Default => "default",
        }
    }

    /// Get all column families.
    pub fn all() -> &'static [ColumnFamily] {
        &[
            ColumnFamily::State,
            ColumnFamily::Metadata,
            ColumnFamily::Default,
        ]
    }
}

/// Metadata key holding the chain identifier.
pub const CHAIN_ID_KEY: &[u8] = b"chain_id";

/// RocksDB database wrapper.
///
/// The [`Store`] implementation reads and writes the `State` column family;
/// ordinal and hash queries iterate it in key order, which RocksDB
/// guarantees bytewise.
pub struct Database {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref();
        info!("Opening database at {:?}", path);

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_max_open_files(256);
        opts.set_keep_log_file_num(1);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = ColumnFamily::all()
            .iter()
            .map(|cf| {
                let mut cf_opts = Options::default();
                cf_opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
                ColumnFamilyDescriptor::new(cf.name(), cf_opts)
            })
            .collect();

        let db =
            DBWithThreadMode::<MultiThreaded>::open_cf_descriptors(&opts, path, cf_descriptors)?;

        debug!("Database opened successfully");

        Ok(Self { db: Arc::new(db) })
    }

    /// Open a database in read-only mode.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref();
        info!("Opening database in read-only mode at {:?}", path);

        let opts = Options::default();
        let cf_names: Vec<&str> = ColumnFamily::all().iter().map(|cf| cf.name()).collect();

        let db =
            DBWithThreadMode::<MultiThreaded>::open_cf_for_read_only(&opts, path, cf_names, false)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, cf: ColumnFamily) -> StorageResult<Arc<rocksdb::BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(cf.name())
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(cf.name().to_string()))
    }

    /// Read a metadata value.
    pub fn get_metadata(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let handle = self.cf(ColumnFamily::Metadata)?;
        Ok(self.db.get_cf(&handle, key)?)
    }

    /// Write a metadata value.
    pub fn put_metadata(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        let handle = self.cf(ColumnFamily::Metadata)?;
        self.db.put_cf(&handle, key, value)?;
        Ok(())
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> StorageResult<()> {
        for cf in ColumnFamily::all() {
            if let Some(handle) = self.db.cf_handle(cf.name()) {
                self.db.flush_cf(&handle)?;
            }
        }
        Ok(())
    }

    fn state_entries(&self) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let handle = self.cf(ColumnFamily::State)?;
        let iter = self.db.iterator_cf(&handle, rocksdb::IteratorMode::Start);
        let mut entries = Vec::new();
        for item in iter {
            let (k, v) = item?;
            entries.push((k.to_vec(), v.to_vec()));
        }
        Ok(entries)
    }
}

impl Store for Database {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let handle = self.cf(ColumnFamily::State)?;
        Ok(self.db.get_cf(&handle, key)?)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        let handle = self.cf(ColumnFamily::State)?;
        if value.is_empty() {
            self.db.delete_cf(&handle, key)?;
        } else {
            self.db.put_cf(&handle, key, value)?;
        }
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.state_entries()?.len() as u64)
    }

    fn key_at(&self, index: u64) -> StorageResult<Option<Vec<u8>>> {
        Ok(self
            .state_entries()?
            .into_iter()
            .nth(index as usize)
            .map(|(k, _)| k))
    }

    fn iter(&self) -> StorageResult<Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)> + '_>> {
        Ok(Box::new(self.state_entries()?.into_iter()))
    }

    fn root_hash(&self) -> StorageResult<Vec<u8>> {
        Ok(merkle_root(self.state_entries()?))
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_database_open_and_write() {
        let tmp = TempDir::new().unwrap();
        let db = Database::open(tmp.path()).unwrap();

        db.set(b"key1", b"value1").unwrap();
        assert_eq!(db.get(b"key1").unwrap(), Some(b"value1".to_vec()));

        // Empty value clears
        db.set(b"key1", b"").unwrap();
        assert_eq!(db.get(b"key1").unwrap(), None);
        assert_eq!(db.size().unwrap(), 0);
    }

    #[test]
    fn test_read_only_open_rejects_writes() {
        let tmp = TempDir::new().unwrap();
        {
            let db = Database::open(tmp.path()).unwrap();
            db.set(b"a", b"1").unwrap();
            db.flush().unwrap();
        }

        let ro = Database::open_read_only(tmp.path()).unwrap();
        assert_eq!(ro.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert!(ro.set(b"a", b"2").is_err());
        assert!(ro.set(b"a", b"").is_err());
    }

    #[test]
    fn test_key_order_matches_memory_semantics() {
        let tmp = TempDir::new().unwrap();
        let db = Database::open(tmp.path()).unwrap();

        db.set(b"b", b"2").unwrap();
        db.set(b"a", b"1").unwrap();

        assert_eq!(db.key_at(0).unwrap(), Some(b"a".to_vec()));
        assert_eq!(db.key_at(1).unwrap(), Some(b"b".to_vec()));
        assert_eq!(db.key_at(2).unwrap(), None);
    }

    #[test]
    fn test_root_hash_matches_memory_store() {
        let tmp = TempDir::new().unwrap();
        let db = Database::open(tmp.path()).unwrap();
        let mem = crate::MemoryStore::new();

        for (k, v) in [(b"a".as_slice(), b"1".as_slice()), (b"b", b"2")] {
            db.set(k, v).unwrap();
            mem.set(k, v).unwrap();
        }

        assert_eq!(db.root_hash().unwrap(), mem.root_hash().unwrap());
    }

    #[test]
    fn test_metadata_round_trip() {
        let tmp = TempDir::new().unwrap();
        let db = Database::open(tmp.path()).unwrap();

        assert_eq!(db.get_metadata(CHAIN_ID_KEY).unwrap(), None);
        db.put_metadata(CHAIN_ID_KEY, b"civic-main").unwrap();
        assert_eq!(
            db.get_metadata(CHAIN_ID_KEY).unwrap(),
            Some(b"civic-main".to_vec())
        );

        // Metadata stays out of the state hash
        let empty = crate::MemoryStore::new().root_hash().unwrap();
        assert_eq!(db.root_hash().unwrap(), empty);
    }
}
