//! Account records.

use crate::{Address, DocumentId, PubKey, TypesError, TypesResult};
use serde::{Deserialize, Serialize};

/// A ledger account.
///
/// Keyed in the store by the 20-byte address derived from `pub_key`. The
/// sequence counter starts at 0 and increases by exactly one per committed
/// transaction authored by this account; the document list is append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The key transactions must be signed with.
    pub pub_key: PubKey,
    /// Monotonic transaction counter.
    pub sequence: u64,
    /// Identifiers of documents submitted by this account.
    pub document_ids: Vec<DocumentId>,
    /// Optional display label.
    pub label: Option<String>,
}

impl Account {
    /// Create a fresh account for a public key, with sequence 0 and no
    /// documents.
    pub fn new(pub_key: PubKey) -> Self {
        Self {
            pub_key,
            sequence: 0,
            document_ids: Vec::new(),
            label: None,
        }
    }

    /// The address this account is stored under.
    pub fn address(&self) -> Address {
        self.pub_key.address()
    }

    /// Canonical byte encoding.
    pub fn encode(&self) -> TypesResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| TypesError::Encoding(e.to_string()))
    }

    /// Decode from the canonical byte encoding.
    pub fn decode(bytes: &[u8]) -> TypesResult<Self> {
        bincode::deserialize(bytes).map_err(|e| TypesError::Encoding(e.to_string()))
    }
}
