//! Property-based tests using proptest.
//!
//! These tests verify invariants of the ledger core using randomly
//! generated data with shrinking support.

use crate::generators::*;
use crate::harness::{TestContext, TEST_CHAIN_ID};
use chrono::{TimeZone, Utc};
use ledger_filter::{CountingFilter, FilterConfig};
use ledger_storage::{KvCache, MemoryStore, Store};
use ledger_types::{Account, Document, DocumentId};
use proptest::prelude::*;
use std::sync::Arc;

/// Generate arbitrary short byte keys.
fn arb_key() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..32)
}

/// Generate arbitrary non-empty values.
fn arb_value() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..64)
}

/// Generate printable category/location strings.
fn arb_label() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,24}"
}

/// Generate timestamps within a sane range (2020 to 2030).
fn arb_timestamp() -> impl Strategy<Value = i64> {
    1_577_836_800i64..=1_893_456_000i64
}

proptest! {
    /// The document identifier is a pure function of category, location,
    /// and the minute-truncated timestamp.
    #[test]
    fn document_id_deterministic(
        category in arb_label(),
        location in arb_label(),
        secs in arb_timestamp(),
        desc_a in arb_label(),
        desc_b in arb_label(),
    ) {
        let pair = test_keypair(1);
        let posted_at = Utc.timestamp_opt(secs, 0).unwrap();
        let make = |description: &str| Document {
            category: category.clone(),
            description: description.to_string(),
            location: location.clone(),
            posted_at,
            submitter: pair.address(),
            attachment: None,
            content_type: None,
        };

        prop_assert_eq!(make(&desc_a).id(), make(&desc_b).id());

        // And it matches the XOR-fold computed directly.
        let minute = posted_at.format("%Y-%m-%dT%H:%M").to_string();
        let expected = DocumentId::fold([
            minute.as_bytes(),
            category.as_bytes(),
            location.as_bytes(),
        ]);
        prop_assert_eq!(make(&desc_a).id(), expected);
    }

    /// After a cache flush the store holds exactly the last-written value
    /// for every key, regardless of write order or repetition.
    #[test]
    fn cache_flush_applies_last_writes(
        writes in prop::collection::vec((arb_key(), arb_value()), 1..40)
    ) {
        let store = Arc::new(MemoryStore::new());
        let mut cache = KvCache::new(store.clone() as Arc<dyn Store>);

        for (key, value) in &writes {
            cache.set(key, value);
        }
        cache.sync().unwrap();

        // Last write per key wins.
        let mut expected: std::collections::BTreeMap<Vec<u8>, Vec<u8>> = Default::default();
        for (key, value) in &writes {
            expected.insert(key.clone(), value.clone());
        }
        for (key, value) in &expected {
            prop_assert_eq!(store.get(key).unwrap(), Some(value.clone()));
        }
        prop_assert_eq!(store.size().unwrap(), expected.len() as u64);
    }

    /// Flushing the same writes through two independent caches yields
    /// identical store hashes.
    #[test]
    fn cache_flush_is_deterministic(
        writes in prop::collection::vec((arb_key(), arb_value()), 1..30)
    ) {
        let run = || {
            let store = Arc::new(MemoryStore::new());
            let mut cache = KvCache::new(store.clone() as Arc<dyn Store>);
            for (key, value) in &writes {
                cache.set(key, value);
            }
            cache.sync().unwrap();
            store.root_hash().unwrap()
        };
        prop_assert_eq!(run(), run());
    }

    /// Everything added to a filter reads as present: no false negatives.
    #[test]
    fn filter_has_no_false_negatives(
        items in prop::collection::hash_set(prop::collection::vec(any::<u8>(), 4..24), 1..80)
    ) {
        let mut filter = CountingFilter::new(FilterConfig {
            capacity: 100,
            fp_rate: 0.01,
        }).unwrap();

        for item in &items {
            filter.add(item).unwrap();
        }
        for item in &items {
            prop_assert!(filter.lookup(item).0);
        }
    }

    /// Applying N document submissions leaves the account at sequence N+1
    /// (one for the create), and a stale or skipped sequence is rejected
    /// without moving the counter.
    #[test]
    fn sequence_tracks_committed_transactions(count in 1u64..8) {
        let ctx = TestContext::in_memory();
        let pair = test_keypair(5);
        ctx.executor.execute(&create_account_tx(&pair, TEST_CHAIN_ID), false);

        for n in 0..count {
            let doc = test_document(&pair, "pothole", &format!("block {n}"));
            let response = ctx.executor.execute(
                &submit_document_tx(&pair, 2 + n, &doc, TEST_CHAIN_ID),
                false,
            );
            prop_assert!(response.is_ok());
        }

        let raw = ctx.store.get(pair.address().as_bytes()).unwrap().unwrap();
        let account = Account::decode(&raw).unwrap();
        prop_assert_eq!(account.sequence, count + 1);
        prop_assert_eq!(account.document_ids.len() as u64, count);

        // Stale sequence.
        let doc = test_document(&pair, "pothole", "stale");
        let response = ctx.executor.execute(
            &submit_document_tx(&pair, count, &doc, TEST_CHAIN_ID),
            false,
        );
        prop_assert!(!response.is_ok());

        // Skipped sequence.
        let response = ctx.executor.execute(
            &submit_document_tx(&pair, count + 10, &doc, TEST_CHAIN_ID),
            false,
        );
        prop_assert!(!response.is_ok());

        let raw = ctx.store.get(pair.address().as_bytes()).unwrap().unwrap();
        prop_assert_eq!(Account::decode(&raw).unwrap().sequence, count + 1);
    }

    /// Garbage transaction bytes never panic the executor and never
    /// mutate state.
    #[test]
    fn garbage_tx_bytes_are_rejected_cleanly(
        bytes in prop::collection::vec(any::<u8>(), 0..256)
    ) {
        let ctx = TestContext::in_memory();
        let response = ctx.executor.execute(&bytes, false);
        prop_assert!(!response.is_ok());
        prop_assert_eq!(ctx.store.size().unwrap(), 0);
    }

    /// Garbage query bytes never panic and never mutate.
    #[test]
    fn garbage_query_bytes_are_rejected_cleanly(
        bytes in prop::collection::vec(any::<u8>(), 0..64)
    ) {
        let ctx = TestContext::in_memory();
        let before = ctx.store.root_hash().unwrap();
        let _ = ctx.executor.query(&bytes);
        prop_assert_eq!(ctx.store.root_hash().unwrap(), before);
    }
}
