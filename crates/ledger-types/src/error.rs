//! Error types for ledger core types.

use thiserror::Error;

/// Errors raised while decoding or validating core types.
#[derive(Error, Debug)]
pub enum TypesError {
    /// Encoding or decoding failure.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Invalid address length.
    #[error("Invalid address length: expected {expected}, got {got}")]
    InvalidAddressLength { expected: usize, got: usize },
}

/// Result type for core type operations.
pub type TypesResult<T> = Result<T, TypesError>;
