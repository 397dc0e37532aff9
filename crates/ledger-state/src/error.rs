//! Error types for the execution engine.

use crate::Code;
use thiserror::Error;

/// Execution and query errors.
#[derive(Error, Debug)]
pub enum StateError {
    /// Malformed transaction or query bytes.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Unrecognized transaction type or query tag.
    #[error("Unknown request: {0}")]
    UnknownRequest(String),

    /// Transaction input failed shape validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Declared sequence does not match the account.
    #[error("Invalid sequence: expected {expected}, got {got}")]
    InvalidSequence { expected: u64, got: u64 },

    /// Signature does not verify under the account's key.
    #[error("Invalid signature")]
    InvalidSignature,

    /// No account at the declared address.
    #[error("Unknown address: {0}")]
    UnknownAddress(String),

    /// Key or index not present in the store.
    #[error("Not found")]
    NotFound,

    /// A document with this identifier is already committed.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Missing or invalid engine configuration; fatal, not retryable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A committed record failed to decode; indicates store corruption.
    #[error("Corrupt state entry: {0}")]
    Corrupt(String),

    /// Internal failure while encoding engine-produced records.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Storage failure.
    #[error("Storage error: {0}")]
    Storage(#[from] ledger_storage::StorageError),
}

impl StateError {
    /// The result code surfaced to callers for this error.
    pub fn code(&self) -> Code {
        match self {
            StateError::Encoding(_) => Code::EncodingError,
            StateError::UnknownRequest(_) => Code::UnknownRequest,
            StateError::InvalidInput(_) => Code::InvalidInput,
            StateError::InvalidSequence { .. } => Code::InvalidSequence,
            StateError::InvalidSignature => Code::InvalidSignature,
            StateError::UnknownAddress(_) => Code::UnknownAddress,
            StateError::NotFound => Code::NotFound,
            StateError::AlreadyExists(_) => Code::AlreadyExists,
            StateError::Config(_)
            | StateError::Corrupt(_)
            | StateError::Internal(_)
            | StateError::Storage(_) => Code::InternalError,
        }
    }
}

/// Result type for state operations.
pub type StateResult<T> = Result<T, StateError>;
