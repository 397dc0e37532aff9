//! Structured results returned to callers.

use crate::StateError;

/// Result codes for execute/query operations.
///
/// Callers branch on the code; they never see a panic from malformed
/// external input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Code {
    /// Success.
    Ok = 0,
    /// Malformed transaction or query bytes.
    EncodingError = 1,
    /// Unrecognized transaction type or query tag.
    UnknownRequest = 2,
    /// Transaction input failed shape validation.
    InvalidInput = 3,
    /// Declared sequence does not match the account.
    InvalidSequence = 4,
    /// Signature does not verify.
    InvalidSignature = 5,
    /// No account at the declared address.
    UnknownAddress = 6,
    /// Key or index not present.
    NotFound = 7,
    /// Entity already exists (duplicate document).
    AlreadyExists = 8,
    /// Storage or invariant failure; not retryable by the caller.
    InternalError = 9,
}

/// A structured operation result: code, optional data, human-readable log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Result code.
    pub code: Code,
    /// Result payload (e.g. a document identifier, a queried value).
    pub data: Vec<u8>,
    /// Human-readable context; empty on plain success.
    pub log: String,
}

impl Response {
    /// Success with a payload.
    pub fn ok(data: Vec<u8>) -> Self {
        Self {
            code: Code::Ok,
            data,
            log: String::new(),
        }
    }

    /// Whether the operation succeeded.
    pub fn is_ok(&self) -> bool {
        self.code == Code::Ok
    }
}

impl From<StateError> for Response {
    fn from(err: StateError) -> Self {
        Self {
            code: err.code(),
            data: Vec::new(),
            log: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_carries_code_and_log() {
        let response = Response::from(StateError::InvalidSignature);
        assert_eq!(response.code, Code::InvalidSignature);
        assert!(!response.is_ok());
        assert!(!response.log.is_empty());
        assert!(response.data.is_empty());
    }

    #[test]
    fn test_ok_response() {
        let response = Response::ok(vec![1, 2, 3]);
        assert!(response.is_ok());
        assert_eq!(response.data, vec![1, 2, 3]);
        assert!(response.log.is_empty());
    }
}
