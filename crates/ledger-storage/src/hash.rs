//! Content hashing for stores.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

const LEAF_PREFIX: u8 = 0x00;
const NODE_PREFIX: u8 = 0x01;

/// Compute a Merkle root over entries in key order.
///
/// Leaves hash the length-delimited `(key, value)` pair; inner nodes hash
/// the concatenation of their children. An odd node at the end of a level
/// is promoted unchanged. The empty store hashes to Blake2b256 of the
/// empty string, a fixed 32-byte value.
pub fn merkle_root<I>(entries: I) -> Vec<u8>
where
    I: IntoIterator<Item = (Vec<u8>, Vec<u8>)>,
{
    let mut level: Vec<[u8; 32]> = entries
        .into_iter()
        .map(|(k, v)| leaf_hash(&k, &v))
        .collect();

    if level.is_empty() {
        return Blake2b256::digest(b"").to_vec();
    }

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => node_hash(left, right),
                [odd] => *odd,
                _ => unreachable!("chunks(2) yields one or two elements"),
            })
            .collect();
    }

    level[0].to_vec()
}

fn leaf_hash(key: &[u8], value: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update((key.len() as u64).to_be_bytes());
    hasher.update(key);
    hasher.update((value.len() as u64).to_be_bytes());
    hasher.update(value);
    hasher.finalize().into()
}

fn node_hash(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update([NODE_PREFIX]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}
