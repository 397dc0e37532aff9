//! Transaction validation and execution.

use crate::{query, Response, StateError, StateResult};
use ledger_filter::FilterSet;
use ledger_storage::{KvCache, Store};
use ledger_types::{Account, Address, Document, Transaction, TxType, ADDRESS_LENGTH};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// The acting account for a transaction, after resolution.
struct Resolved {
    account: Account,
    address: Address,
    /// Whether the account was loaded from the store (vs. synthesized by
    /// CreateAccount). Only loaded accounts are restored on rollback.
    existing: bool,
}

/// The deterministic apply function of the ledger.
///
/// Validates signed, sequenced transactions against account state and
/// applies type-specific transitions through a fresh [`KvCache`] per
/// transaction: success flushes the cache into the store, failure discards
/// it and restores the pre-transition account snapshot, so a rejected
/// apply never leaves a sequence bump without its side effects.
///
/// Full application is serialized behind an internal lock that covers
/// account resolution through cache flush, so the sequence check always
/// runs against the latest committed account record. Validation-only calls
/// and queries read the store without taking it and may run concurrently;
/// their verdicts are advisory and are re-checked on apply.
pub struct Executor {
    store: Arc<dyn Store>,
    filters: Arc<FilterSet>,
    chain_id: String,
    apply_lock: Mutex<()>,
}

impl Executor {
    /// Create an executor over a store and filter set.
    ///
    /// An empty chain id is a configuration error: sign-bytes embed the
    /// chain id, and accepting transactions without one would make them
    /// replayable across chains.
    pub fn new(
        store: Arc<dyn Store>,
        filters: Arc<FilterSet>,
        chain_id: impl Into<String>,
    ) -> StateResult<Self> {
        let chain_id = chain_id.into();
        if chain_id.is_empty() {
            return Err(StateError::Config("chain id must not be empty".into()));
        }
        Ok(Self {
            store,
            filters,
            chain_id,
            apply_lock: Mutex::new(()),
        })
    }

    /// The chain identifier transactions are bound to.
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Validate and, unless `validate_only`, apply a transaction.
    ///
    /// Never panics on malformed input; every outcome is a [`Response`]
    /// the caller branches on. In `validate_only` mode nothing is mutated,
    /// so duplicate or conflicting transactions can be rejected before
    /// they consume a sequence number.
    #[instrument(skip(self, tx_bytes))]
    pub fn execute(&self, tx_bytes: &[u8], validate_only: bool) -> Response {
        match self.try_execute(tx_bytes, validate_only) {
            Ok(data) => Response::ok(data),
            Err(e) => {
                debug!(error = %e, "transaction rejected");
                e.into()
            }
        }
    }

    /// Answer a typed query against the committed store.
    ///
    /// The request wire format is documented with the `QUERY_*` tag
    /// constants; queries never touch a cache and never mutate.
    pub fn query(&self, request: &[u8]) -> Response {
        match query::handle(self.store.as_ref(), &self.filters, &self.chain_id, request) {
            Ok(data) => Response::ok(data),
            Err(e) => e.into(),
        }
    }

    /// Content hash over the committed state.
    #[instrument(skip(self))]
    pub fn commit(&self) -> StateResult<Vec<u8>> {
        let hash = self.store.root_hash()?;
        info!(app_hash = %hex::encode(&hash), "state committed");
        Ok(hash)
    }

    fn try_execute(&self, tx_bytes: &[u8], validate_only: bool) -> StateResult<Vec<u8>> {
        let tx =
            Transaction::decode(tx_bytes).map_err(|e| StateError::Encoding(e.to_string()))?;
        validate_input(&tx)?;

        if validate_only {
            let resolved = self.resolve_account(&tx)?;
            self.authorize(&tx, &resolved)?;
            debug!(address = %resolved.address, sequence = tx.input.sequence, "transaction validated");
            return Ok(Vec::new());
        }

        // Resolution happens under the lock: two in-flight transactions for
        // the same account must not both authorize against the same
        // committed sequence.
        let _guard = self.apply_lock.lock();
        let mut resolved = self.resolve_account(&tx)?;
        self.authorize(&tx, &resolved)?;

        let snapshot = resolved.account.clone();
        resolved.account.sequence += 1;

        let mut cache = KvCache::new(Arc::clone(&self.store));
        match self.apply_transition(&mut cache, &tx, &mut resolved) {
            Ok(data) => {
                cache.sync()?;
                info!(
                    tx_type = ?tx.tx_type,
                    address = %resolved.address,
                    sequence = resolved.account.sequence,
                    "transaction committed"
                );
                Ok(data)
            }
            Err(e) => {
                // Discard the cache unflushed; the outer store never saw
                // the transition. Restoring the snapshot keeps the
                // persisted sequence at its pre-call value.
                drop(cache);
                if resolved.existing {
                    let encoded = snapshot
                        .encode()
                        .map_err(|err| StateError::Internal(err.to_string()))?;
                    self.store.set(resolved.address.as_bytes(), &encoded)?;
                }
                warn!(error = %e, address = %resolved.address, "transaction rolled back");
                Err(e)
            }
        }
    }

    /// Sequence before signature; the order matters for diagnostics.
    fn authorize(&self, tx: &Transaction, resolved: &Resolved) -> StateResult<()> {
        let expected = resolved.account.sequence + 1;
        if tx.input.sequence != expected {
            return Err(StateError::InvalidSequence {
                expected,
                got: tx.input.sequence,
            });
        }
        if !tx.verify_signature(&resolved.account.pub_key, &self.chain_id) {
            return Err(StateError::InvalidSignature);
        }
        Ok(())
    }

    /// Resolve the acting account: synthesized for CreateAccount, loaded
    /// from the store otherwise. An embedded public key on a non-create
    /// transaction updates the in-memory account before validation; it is
    /// persisted only if the transition commits.
    fn resolve_account(&self, tx: &Transaction) -> StateResult<Resolved> {
        if tx.tx_type == TxType::CreateAccount {
            let pub_key = tx.input.pub_key.clone().ok_or_else(|| {
                StateError::InvalidInput("create account requires an embedded public key".into())
            })?;
            let account = Account::new(pub_key);
            let address = account.address();
            return Ok(Resolved {
                account,
                address,
                existing: false,
            });
        }

        let address = Address::try_from(tx.input.address.as_slice())
            .map_err(|e| StateError::InvalidInput(e.to_string()))?;
        let raw = self
            .store
            .get(address.as_bytes())?
            .ok_or_else(|| StateError::UnknownAddress(address.to_string()))?;
        let mut account =
            Account::decode(&raw).map_err(|e| StateError::Corrupt(e.to_string()))?;
        if let Some(pub_key) = &tx.input.pub_key {
            account.pub_key = pub_key.clone();
        }
        Ok(Resolved {
            account,
            address,
            existing: true,
        })
    }

    fn apply_transition(
        &self,
        cache: &mut KvCache,
        tx: &Transaction,
        resolved: &mut Resolved,
    ) -> StateResult<Vec<u8>> {
        match tx.tx_type {
            TxType::CreateAccount => {
                if cache.get(resolved.address.as_bytes())?.is_some() {
                    // Reuse of a removed account's address is undefined
                    // behavior; flag it rather than silently permit.
                    warn!(
                        address = %resolved.address,
                        "create account over an occupied address"
                    );
                }
                let encoded = resolved
                    .account
                    .encode()
                    .map_err(|e| StateError::Internal(e.to_string()))?;
                cache.set(resolved.address.as_bytes(), &encoded);
                Ok(Vec::new())
            }
            TxType::RemoveAccount => {
                // Cleared, not tombstoned: the sequence and document list
                // are not reclaimed.
                cache.set(resolved.address.as_bytes(), &[]);
                Ok(Vec::new())
            }
            TxType::SubmitDocument => {
                let doc = Document::decode(&tx.data)
                    .map_err(|e| StateError::Encoding(e.to_string()))?;
                let id = doc.id();
                if cache.get(id.as_bytes())?.is_some() {
                    return Err(StateError::AlreadyExists(id.to_string()));
                }
                let encoded_doc = doc
                    .encode()
                    .map_err(|e| StateError::Internal(e.to_string()))?;
                cache.set(id.as_bytes(), &encoded_doc);

                // The filter is an index, not a source of truth; a failed
                // add costs a false negative in category search, never the
                // transaction.
                if let Err(e) = self.filters.add(&doc.category, id.as_bytes()) {
                    warn!(category = %doc.category, id = %id, error = %e, "filter add failed");
                }

                resolved.account.document_ids.push(id);
                let encoded_account = resolved
                    .account
                    .encode()
                    .map_err(|e| StateError::Internal(e.to_string()))?;
                cache.set(resolved.address.as_bytes(), &encoded_account);
                Ok(id.as_bytes().to_vec())
            }
            TxType::CreateAdmin | TxType::RemoveAdmin => Err(StateError::UnknownRequest(
                format!("{:?} is reserved", tx.tx_type),
            )),
        }
    }
}

/// Input shape validation; violations never touch state.
fn validate_input(tx: &Transaction) -> StateResult<()> {
    if tx.input.address.len() != ADDRESS_LENGTH {
        return Err(StateError::InvalidInput(format!(
            "address must be {ADDRESS_LENGTH} bytes, got {}",
            tx.input.address.len()
        )));
    }
    if tx.input.sequence == 0 {
        return Err(StateError::InvalidInput("sequence must be positive".into()));
    }
    match (tx.input.sequence == 1, tx.input.pub_key.is_some()) {
        (true, false) => Err(StateError::InvalidInput(
            "first transaction must embed a public key".into(),
        )),
        (false, true) => Err(StateError::InvalidInput(
            "public key is only allowed on the first transaction".into(),
        )),
        _ => Ok(()),
    }
}
