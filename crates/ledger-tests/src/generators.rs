//! Builders for signed transactions and documents used across tests.

use chrono::{DateTime, TimeZone, Utc};
use ledger_types::{Document, Keypair, Signature, Transaction, TxInput, TxType};

/// A deterministic keypair for a test actor.
pub fn test_keypair(seed: u8) -> Keypair {
    Keypair::from_seed([seed; 32])
}

/// A fixed submission timestamp (2024-03-01T10:15:00Z).
pub fn test_posted_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap()
}

/// A sample document submitted by the given keypair's account.
pub fn test_document(pair: &Keypair, category: &str, location: &str) -> Document {
    Document {
        category: category.to_string(),
        description: format!("{category} reported at {location}"),
        location: location.to_string(),
        posted_at: test_posted_at(),
        submitter: pair.address(),
        attachment: None,
        content_type: None,
    }
}

/// A signed CreateAccount transaction (sequence 1, embedded pubkey).
pub fn create_account_tx(pair: &Keypair, chain_id: &str) -> Vec<u8> {
    sign_and_encode(
        TxType::CreateAccount,
        pair,
        1,
        Some(pair),
        Vec::new(),
        chain_id,
    )
}

/// A signed RemoveAccount transaction.
pub fn remove_account_tx(pair: &Keypair, sequence: u64, chain_id: &str) -> Vec<u8> {
    sign_and_encode(TxType::RemoveAccount, pair, sequence, None, Vec::new(), chain_id)
}

/// A signed SubmitDocument transaction.
pub fn submit_document_tx(
    pair: &Keypair,
    sequence: u64,
    doc: &Document,
    chain_id: &str,
) -> Vec<u8> {
    let data = doc.encode().expect("document encodes");
    sign_and_encode(TxType::SubmitDocument, pair, sequence, None, data, chain_id)
}

fn sign_and_encode(
    tx_type: TxType,
    pair: &Keypair,
    sequence: u64,
    embed_key: Option<&Keypair>,
    data: Vec<u8>,
    chain_id: &str,
) -> Vec<u8> {
    let mut tx = Transaction::new(
        tx_type,
        TxInput {
            address: pair.address().as_bytes().to_vec(),
            sequence,
            pub_key: embed_key.map(|p| p.pub_key()),
            signature: Signature::default(),
        },
        data,
    );
    tx.sign(pair, chain_id).expect("signing succeeds");
    tx.encode().expect("transaction encodes")
}
