//! Ed25519 keys, signatures, and address derivation.

use crate::{TypesError, TypesResult};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use ed25519_dalek::{Signer, Verifier};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Public key length in bytes (Ed25519).
pub const PUBKEY_LENGTH: usize = 32;
/// Address length in bytes.
pub const ADDRESS_LENGTH: usize = 20;
/// Signature length in bytes (Ed25519).
pub const SIGNATURE_LENGTH: usize = 64;

type Blake2b256 = Blake2b<U32>;

/// An Ed25519 public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubKey([u8; PUBKEY_LENGTH]);

impl PubKey {
    /// Construct from raw bytes. The bytes are validated as a curve point
    /// lazily, at verification time.
    pub fn from_bytes(bytes: [u8; PUBKEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; PUBKEY_LENGTH] {
        &self.0
    }

    /// Derive the account address: the first 20 bytes of Blake2b256(pubkey).
    pub fn address(&self) -> Address {
        let digest = Blake2b256::digest(self.0);
        let mut out = [0u8; ADDRESS_LENGTH];
        out.copy_from_slice(&digest[..ADDRESS_LENGTH]);
        Address(out)
    }

    /// Verify a signature over a message under this key.
    ///
    /// Returns `false` for malformed keys or signatures as well as for
    /// honest verification failures; external input never panics here.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(key) = ed25519_dalek::VerifyingKey::from_bytes(&self.0) else {
            return false;
        };
        let raw: [u8; SIGNATURE_LENGTH] = match signature.0.as_slice().try_into() {
            Ok(raw) => raw,
            Err(_) => return false,
        };
        let sig = ed25519_dalek::Signature::from_bytes(&raw);
        key.verify(message, &sig).is_ok()
    }
}

impl fmt::Display for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A 20-byte account address derived from a public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Construct from raw bytes.
    pub fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = TypesError;

    fn try_from(bytes: &[u8]) -> TypesResult<Self> {
        let raw: [u8; ADDRESS_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| TypesError::InvalidAddressLength {
                    expected: ADDRESS_LENGTH,
                    got: bytes.len(),
                })?;
        Ok(Self(raw))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A detached Ed25519 signature.
///
/// The default (empty) value stands for "unsigned" and is what sign-bytes
/// are computed over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Construct from raw signature bytes.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes.to_vec())
    }

    /// Raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether the signature field has been filled in.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An Ed25519 signing keypair.
///
/// Key custody (encryption at rest, passphrases) is the host application's
/// concern; this type only covers generation and signing.
pub struct Keypair {
    signing: ed25519_dalek::SigningKey,
}

impl Keypair {
    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        Self {
            signing: ed25519_dalek::SigningKey::generate(&mut OsRng),
        }
    }

    /// Restore a keypair from its 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing: ed25519_dalek::SigningKey::from_bytes(&seed),
        }
    }

    /// The public half of the keypair.
    pub fn pub_key(&self) -> PubKey {
        PubKey(self.signing.verifying_key().to_bytes())
    }

    /// The address derived from the public key.
    pub fn address(&self) -> Address {
        self.pub_key().address()
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::from_bytes(self.signing.sign(message).to_bytes())
    }
}
