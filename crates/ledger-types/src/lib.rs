//! # ledger-types
//!
//! Core types for the document ledger.
//!
//! This crate provides:
//! - Ed25519 keys, signatures, and address derivation
//! - Account records (public key, sequence counter, owned documents)
//! - The signed, sequenced transaction envelope and its canonical encoding
//! - Documents and their deterministic 16-byte identifiers
//!
//! ## Canonical encoding
//!
//! Transactions, accounts, and documents are encoded with `bincode`, which
//! is deterministic for a fixed type definition. Sign-bytes are the chain
//! identifier concatenated with the transaction encoded with its signature
//! field cleared; signing fills in the signature as the last step.

mod account;
mod document;
mod error;
mod keys;
mod transaction;

pub use account::Account;
pub use document::{Document, DocumentId, DOCUMENT_ID_LENGTH};
pub use error::{TypesError, TypesResult};
pub use keys::{Address, Keypair, PubKey, Signature, ADDRESS_LENGTH, PUBKEY_LENGTH, SIGNATURE_LENGTH};
pub use transaction::{Transaction, TxInput, TxType};
