//! Error types for the storage layer.

use thiserror::Error;

/// Storage layer errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// RocksDB error.
    #[error("Database error: {0}")]
    Database(#[from] rocksdb::Error),

    /// Column family missing from an opened database.
    #[error("Column family not found: {0}")]
    ColumnFamilyNotFound(String),

    /// A cache flush aborted partway through.
    #[error("Cache sync aborted after {applied} of {total} writes: {source}")]
    SyncAborted {
        applied: usize,
        total: usize,
        #[source]
        source: Box<StorageError>,
    },
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
