//! Error types for filters.

use thiserror::Error;

/// Filter errors.
#[derive(Error, Debug)]
pub enum FilterError {
    /// A counter would overflow; the item cannot be tracked accurately.
    #[error("Filter counter saturated")]
    CounterSaturated,

    /// Invalid filter configuration.
    #[error("Invalid filter config: {0}")]
    InvalidConfig(String),
}

/// Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;
