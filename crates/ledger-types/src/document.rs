//! Submitted documents and their deterministic identifiers.

use crate::{Address, TypesError, TypesResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Document identifier length in bytes.
pub const DOCUMENT_ID_LENGTH: usize = 16;

/// Timestamp format used for identity: truncated to the minute.
const ID_MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// A 16-byte document identifier.
///
/// Computed by XOR-folding the UTF-8 bytes of the minute-truncated
/// timestamp, the category, and the location into a zeroed buffer. This is
/// deliberately not a cryptographic hash: two submissions with the same
/// category and location in the same minute collide, and that collision is
/// the duplicate-detection scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId([u8; DOCUMENT_ID_LENGTH]);

impl DocumentId {
    /// Construct from raw bytes.
    pub fn from_bytes(bytes: [u8; DOCUMENT_ID_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8; DOCUMENT_ID_LENGTH] {
        &self.0
    }

    /// XOR-fold a sequence of byte strings into a fresh identifier.
    ///
    /// For each item, `buf[i] ^= item[i]` for `i < len(item)`; bytes past
    /// the 16th of any item are ignored.
    pub fn fold<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut buf = [0u8; DOCUMENT_ID_LENGTH];
        for item in items {
            for (i, b) in item.iter().take(DOCUMENT_ID_LENGTH).enumerate() {
                buf[i] ^= b;
            }
        }
        Self(buf)
    }
}

impl TryFrom<&[u8]> for DocumentId {
    type Error = TypesError;

    fn try_from(bytes: &[u8]) -> TypesResult<Self> {
        let raw: [u8; DOCUMENT_ID_LENGTH] = bytes.try_into().map_err(|_| {
            TypesError::Encoding(format!(
                "document id must be {DOCUMENT_ID_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(raw))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A submitted document (report, complaint, form).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Category or issue tag (e.g. "pothole").
    pub category: String,
    /// Free-text description.
    pub description: String,
    /// Location string.
    pub location: String,
    /// Submission timestamp.
    pub posted_at: DateTime<Utc>,
    /// Address of the submitting account.
    pub submitter: Address,
    /// Optional binary attachment.
    pub attachment: Option<Vec<u8>>,
    /// Content type of the attachment, when present.
    pub content_type: Option<String>,
}

impl Document {
    /// Compute the document's identifier from its category, location, and
    /// minute-truncated timestamp. Pure in those three inputs.
    pub fn id(&self) -> DocumentId {
        let minute = self.posted_at.format(ID_MINUTE_FORMAT).to_string();
        DocumentId::fold([
            minute.as_bytes(),
            self.category.as_bytes(),
            self.location.as_bytes(),
        ])
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
