//! Typed queries against the committed store.
//!
//! A query request is a single leading tag byte followed by a
//! tag-specific payload:
//!
//! ```text
//! +--------+------------------------+
//! |  Tag   |        Payload         |
//! | 1 byte |  (tag-specific bytes)  |
//! +--------+------------------------+
//! ```
//!
//! - `0x00` chain id: no payload; returns the chain identifier string
//! - `0x01` size: no payload; returns the entry count, u64 big-endian
//! - `0x02` key lookup: u32 big-endian length prefix + key; returns the value
//! - `0x03` index lookup: LEB128 varint ordinal; returns the key at that
//!   position
//! - `0x04` category list: no payload; returns an encoded `Vec<String>`
//!
//! Trailing bytes, short payloads, and undecodable varints are encoding
//! errors; an unknown tag is an unknown request. Queries read the store
//! (and, for categories, the filter set) directly and never mutate.

use crate::{StateError, StateResult};
use ledger_filter::FilterSet;
use ledger_storage::Store;

/// Query tag: chain identifier.
pub const QUERY_CHAIN_ID: u8 = 0x00;
/// Query tag: store entry count.
pub const QUERY_SIZE: u8 = 0x01;
/// Query tag: value by key.
pub const QUERY_KEY: u8 = 0x02;
/// Query tag: key at ordinal position.
pub const QUERY_INDEX: u8 = 0x03;
/// Query tag: known category names.
pub const QUERY_CATEGORIES: u8 = 0x04;

pub(crate) fn handle(
    store: &dyn Store,
    filters: &FilterSet,
    chain_id: &str,
    request: &[u8],
) -> StateResult<Vec<u8>> {
    let (&tag, payload) = request
        .split_first()
        .ok_or_else(|| StateError::Encoding("empty query".into()))?;

    match tag {
        QUERY_CHAIN_ID => {
            expect_empty(payload)?;
            Ok(chain_id.as_bytes().to_vec())
        }
        QUERY_SIZE => {
            expect_empty(payload)?;
            Ok(store.size()?.to_be_bytes().to_vec())
        }
        QUERY_KEY => {
            let key = decode_length_prefixed(payload)?;
            store.get(&key)?.ok_or(StateError::NotFound)
        }
        QUERY_INDEX => {
            let index = decode_varint_exact(payload)?;
            store.key_at(index)?.ok_or(StateError::NotFound)
        }
        QUERY_CATEGORIES => {
            expect_empty(payload)?;
            bincode::serialize(&filters.categories())
                .map_err(|e| StateError::Internal(e.to_string()))
        }
        other => Err(StateError::UnknownRequest(format!(
            "query tag {other:#04x}"
        ))),
    }
}

fn expect_empty(payload: &[u8]) -> StateResult<()> {
    if payload.is_empty() {
        Ok(())
    } else {
        Err(StateError::Encoding(format!(
            "{} trailing bytes after query tag",
            payload.len()
        )))
    }
}

/// Decode a u32 big-endian length-prefixed key occupying the whole payload.
fn decode_length_prefixed(payload: &[u8]) -> StateResult<Vec<u8>> {
    if payload.len() < 4 {
        return Err(StateError::Encoding("truncated length prefix".into()));
    }
    let (prefix, rest) = payload.split_at(4);
    let len = u32::from_be_bytes(prefix.try_into().expect("4-byte slice")) as usize;
    if rest.len() != len {
        return Err(StateError::Encoding(format!(
            "key length {len} does not match {} payload bytes",
            rest.len()
        )));
    }
    Ok(rest.to_vec())
}

/// Decode a LEB128 varint occupying the whole payload.
fn decode_varint_exact(payload: &[u8]) -> StateResult<u64> {
    let mut value: u64 = 0;
    let mut shift = 0u32;
    for (i, &byte) in payload.iter().enumerate() {
        if shift >= 64 {
            return Err(StateError::Encoding("varint overflow".into()));
        }
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            if i + 1 != payload.len() {
                return Err(StateError::Encoding(format!(
                    "{} trailing bytes after varint",
                    payload.len() - i - 1
                )));
            }
            return Ok(value);
        }
        shift += 7;
    }
    Err(StateError::Encoding("unterminated varint".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Code;
    use ledger_filter::FilterConfig;
    use ledger_storage::MemoryStore;

    fn setup() -> (MemoryStore, FilterSet) {
        let store = MemoryStore::new();
        store.set(b"alpha", b"one").unwrap();
        store.set(b"beta", b"two").unwrap();
        let filters = FilterSet::new(FilterConfig::default()).unwrap();
        filters.add("pothole", b"some-id").unwrap();
        (store, filters)
    }

    fn encode_key_query(key: &[u8]) -> Vec<u8> {
        let mut request = vec![QUERY_KEY];
        request.extend((key.len() as u32).to_be_bytes());
        request.extend(key);
        request
    }

    #[test]
    fn test_chain_id_query() {
        let (store, filters) = setup();
        let data = handle(&store, &filters, "civic-test", &[QUERY_CHAIN_ID]).unwrap();
        assert_eq!(data, b"civic-test");
    }

    #[test]
    fn test_size_query() {
        let (store, filters) = setup();
        let data = handle(&store, &filters, "c", &[QUERY_SIZE]).unwrap();
        assert_eq!(data, 2u64.to_be_bytes());
    }

    #[test]
    fn test_key_lookup() {
        let (store, filters) = setup();
        let data = handle(&store, &filters, "c", &encode_key_query(b"alpha")).unwrap();
        assert_eq!(data, b"one");

        let err = handle(&store, &filters, "c", &encode_key_query(b"missing")).unwrap_err();
        assert_eq!(err.code(), Code::NotFound);
    }

    #[test]
    fn test_index_lookup() {
        let (store, filters) = setup();
        assert_eq!(handle(&store, &filters, "c", &[QUERY_INDEX, 0]).unwrap(), b"alpha");
        assert_eq!(handle(&store, &filters, "c", &[QUERY_INDEX, 1]).unwrap(), b"beta");

        let err = handle(&store, &filters, "c", &[QUERY_INDEX, 2]).unwrap_err();
        assert_eq!(err.code(), Code::NotFound);
    }

    #[test]
    fn test_category_list() {
        let (store, filters) = setup();
        let data = handle(&store, &filters, "c", &[QUERY_CATEGORIES]).unwrap();
        let names: Vec<String> = bincode::deserialize(&data).unwrap();
        assert_eq!(names, vec!["pothole".to_string()]);
    }

    #[test]
    fn test_malformed_payloads() {
        let (store, filters) = setup();

        for request in [
            Vec::new(),                            // empty
            vec![QUERY_CHAIN_ID, 0xff],            // trailing bytes
            vec![QUERY_KEY, 0, 0],                 // truncated length prefix
            vec![QUERY_KEY, 0, 0, 0, 5, b'a'],     // length/payload mismatch
            vec![QUERY_INDEX],                     // missing varint
            vec![QUERY_INDEX, 0x80],               // unterminated varint
            vec![QUERY_INDEX, 0x01, 0x01],         // trailing bytes after varint
        ] {
            let err = handle(&store, &filters, "c", &request).unwrap_err();
            assert_eq!(err.code(), Code::EncodingError, "request {request:?}");
        }

        let err = handle(&store, &filters, "c", &[0x7f]).unwrap_err();
        assert_eq!(err.code(), Code::UnknownRequest);
    }

    #[test]
    fn test_varint_multi_byte() {
        let (store, filters) = setup();
        for i in 0..300u64 {
            store.set(format!("k{i:04}").as_bytes(), b"v").unwrap();
        }
        // 0x82 0x02 = 258
        let data = handle(&store, &filters, "c", &[QUERY_INDEX, 0x82, 0x02]).unwrap();
        assert_eq!(data, store.key_at(258).unwrap().unwrap());
    }
}
