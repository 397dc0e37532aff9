//! Node wiring: storage, filters, and the execution engine.

use crate::config::NodeConfig;
use anyhow::{bail, Context, Result};
use ledger_filter::{FilterConfig, FilterSet};
use ledger_state::Executor;
use ledger_storage::{Database, Store, CHAIN_ID_KEY};
use std::sync::Arc;
use tracing::info;

/// A wired-up ledger node: the persistent store and the executor a
/// transport layer would drive.
pub struct Node {
    db: Database,
    executor: Executor,
}

impl Node {
    /// Initialize a fresh data directory: open (creating) the database and
    /// record the chain id. Fails if the directory was already initialized
    /// with a different chain id.
    pub fn init(config: &NodeConfig) -> Result<()> {
        std::fs::create_dir_all(&config.data_dir)
            .with_context(|| format!("creating data dir {:?}", config.data_dir))?;
        let db = Database::open(&config.data_dir)?;

        match db.get_metadata(CHAIN_ID_KEY)? {
            Some(existing) if existing != config.chain_id.as_bytes() => {
                bail!(
                    "data dir already initialized for chain {:?}",
                    String::from_utf8_lossy(&existing)
                );
            }
            Some(_) => info!(chain_id = %config.chain_id, "data dir already initialized"),
            None => {
                db.put_metadata(CHAIN_ID_KEY, config.chain_id.as_bytes())?;
                info!(chain_id = %config.chain_id, data_dir = ?config.data_dir, "initialized ledger");
            }
        }
        db.flush()?;
        Ok(())
    }

    /// Open an initialized data directory and wire up the executor.
    pub fn open(config: &NodeConfig) -> Result<Self> {
        Self::wire(Database::open(&config.data_dir)?, config)
    }

    /// Open an initialized data directory without write access, for
    /// inspection subcommands that never mutate state.
    pub fn open_read_only(config: &NodeConfig) -> Result<Self> {
        Self::wire(Database::open_read_only(&config.data_dir)?, config)
    }

    fn wire(db: Database, config: &NodeConfig) -> Result<Self> {
        let chain_id = Self::stored_chain_id(&db)?;

        let filters = FilterSet::new(FilterConfig {
            capacity: config.filter.capacity,
            fp_rate: config.filter.fp_rate,
        })?;
        let executor = Executor::new(
            Arc::new(db.clone()) as Arc<dyn Store>,
            Arc::new(filters),
            chain_id,
        )?;

        Ok(Self { db, executor })
    }

    fn stored_chain_id(db: &Database) -> Result<String> {
        let raw = db
            .get_metadata(CHAIN_ID_KEY)?
            .context("data dir not initialized: missing chain id (run `init` first)")?;
        String::from_utf8(raw).context("stored chain id is not valid UTF-8")
    }

    /// The execution engine.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Log a summary of the committed state.
    pub fn report_status(&self) -> Result<()> {
        let size = self.db.size()?;
        let hash = self.executor.commit()?;
        info!(
            chain_id = %self.executor.chain_id(),
            entries = size,
            app_hash = %hex::encode(hash),
            "ledger status"
        );
        Ok(())
    }

    /// The current commit hash.
    pub fn app_hash(&self) -> Result<Vec<u8>> {
        Ok(self.executor.commit()?)
    }
}
