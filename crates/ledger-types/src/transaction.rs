//! The signed, sequenced transaction envelope.

use crate::{Keypair, PubKey, Signature, TypesError, TypesResult};
use serde::{Deserialize, Serialize};

/// Transaction type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxType {
    /// Create a new account from the embedded public key.
    CreateAccount,
    /// Clear an existing account's store entry.
    RemoveAccount,
    /// Submit a document; the payload is an encoded `Document`.
    SubmitDocument,
    /// Reserved admin variant; dispatches to UnknownRequest.
    CreateAdmin,
    /// Reserved admin variant; dispatches to UnknownRequest.
    RemoveAdmin,
}

/// The authenticated portion of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    /// Declared account address; must be exactly 20 bytes.
    pub address: Vec<u8>,
    /// Declared sequence number; must equal the account's sequence + 1.
    pub sequence: u64,
    /// Embedded public key; present iff this is the account's first
    /// transaction (sequence == 1).
    pub pub_key: Option<PubKey>,
    /// Signature over the sign-bytes; empty until `Transaction::sign`.
    pub signature: Signature,
}

/// A signed, sequenced request to mutate the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Dispatch tag.
    pub tx_type: TxType,
    /// Authenticated input.
    pub input: TxInput,
    /// Opaque payload; meaning depends on `tx_type`.
    pub data: Vec<u8>,
}

impl Transaction {
    /// Build an unsigned transaction.
    pub fn new(tx_type: TxType, input: TxInput, data: Vec<u8>) -> Self {
        Self {
            tx_type,
            input,
            data,
        }
    }

    /// Canonical byte encoding (including the signature).
    pub fn encode(&self) -> TypesResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| TypesError::Encoding(e.to_string()))
    }

    /// Decode from the canonical byte encoding.
    pub fn decode(bytes: &[u8]) -> TypesResult<Self> {
        bincode::deserialize(bytes).map_err(|e| TypesError::Encoding(e.to_string()))
    }

    /// The bytes that are signed: the chain identifier followed by the
    /// transaction encoded with its signature field cleared.
    pub fn sign_bytes(&self, chain_id: &str) -> TypesResult<Vec<u8>> {
        let mut unsigned = self.clone();
        unsigned.input.signature = Signature::default();
        let mut bytes = chain_id.as_bytes().to_vec();
        bytes.extend(unsigned.encode()?);
        Ok(bytes)
    }

    /// Sign the transaction, filling in the signature field. Must be the
    /// last step before transmission; everything else is immutable once
    /// signed.
    pub fn sign(&mut self, keypair: &Keypair, chain_id: &str) -> TypesResult<()> {
        let bytes = self.sign_bytes(chain_id)?;
        self.input.signature = keypair.sign(&bytes);
        Ok(())
    }

    /// Verify the signature against the sign-bytes under the given key.
    pub fn verify_signature(&self, pub_key: &PubKey, chain_id: &str) -> bool {
        match self.sign_bytes(chain_id) {
            Ok(bytes) => pub_key.verify(&bytes, &self.input.signature),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ADDRESS_LENGTH;

    fn signed_tx(chain_id: &str) -> (Transaction, Keypair) {
        let pair = Keypair::from_seed([9u8; 32]);
        let input = TxInput {
            address: pair.address().as_bytes().to_vec(),
            sequence: 1,
            pub_key: Some(pair.pub_key()),
            signature: Signature::default(),
        };
        let mut tx = Transaction::new(TxType::CreateAccount, input, Vec::new());
        tx.sign(&pair, chain_id).unwrap();
        (tx, pair)
    }

    #[test]
    fn test_sign_and_verify_round_trip() {
        let (tx, pair) = signed_tx("test-chain");
        assert!(!tx.input.signature.is_empty());
        assert_eq!(tx.input.address.len(), ADDRESS_LENGTH);
        assert!(tx.verify_signature(&pair.pub_key(), "test-chain"));
    }

    #[test]
    fn test_signature_bound_to_chain_id() {
        let (tx, pair) = signed_tx("test-chain");
        assert!(!tx.verify_signature(&pair.pub_key(), "other-chain"));
    }

    #[test]
    fn test_tampering_invalidates_signature() {
        let (mut tx, pair) = signed_tx("test-chain");
        tx.input.sequence = 2;
        assert!(!tx.verify_signature(&pair.pub_key(), "test-chain"));
    }

    #[test]
    fn test_encode_decode_preserves_signature() {
        let (tx, pair) = signed_tx("test-chain");
        let decoded = Transaction::decode(&tx.encode().unwrap()).unwrap();
        assert_eq!(decoded, tx);
        assert!(decoded.verify_signature(&pair.pub_key(), "test-chain"));
    }

    #[test]
    fn test_sign_bytes_clear_signature_field() {
        let (tx, _) = signed_tx("test-chain");
        let mut unsigned = tx.clone();
        unsigned.input.signature = Signature::default();
        assert_eq!(
            tx.sign_bytes("test-chain").unwrap(),
            unsigned.sign_bytes("test-chain").unwrap()
        );
    }
}
