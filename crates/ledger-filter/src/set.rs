//! Per-category filter registry.

use crate::{CountingFilter, FilterConfig, FilterResult};
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

/// One [`CountingFilter`] per named category.
///
/// Filters are created lazily on first `add` to a category, all sized from
/// the same configuration. The map is guarded by a plain `RwLock`; queries
/// and the apply path may hit it concurrently.
pub struct FilterSet {
    config: FilterConfig,
    filters: RwLock<HashMap<String, CountingFilter>>,
}

impl FilterSet {
    /// Create an empty set whose filters will use the given configuration.
    pub fn new(config: FilterConfig) -> FilterResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            filters: RwLock::new(HashMap::new()),
        })
    }

    /// Add an item to a category's filter, creating the filter on first
    /// use.
    pub fn add(&self, category: &str, data: &[u8]) -> FilterResult<()> {
        let mut filters = self.filters.write();
        let filter = match filters.entry(category.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                debug!(category, "creating category filter");
                entry.insert(CountingFilter::new(self.config)?)
            }
        };
        filter.add(data)
    }

    /// Test membership in a category's filter. An unknown category reads
    /// as not found.
    pub fn lookup(&self, category: &str, data: &[u8]) -> (bool, u8) {
        self.filters
            .read()
            .get(category)
            .map(|f| f.lookup(data))
            .unwrap_or((false, 0))
    }

    /// Remove an item from a category's filter.
    pub fn delete(&self, category: &str, data: &[u8]) -> bool {
        self.filters
            .write()
            .get_mut(category)
            .map(|f| f.delete(data))
            .unwrap_or(false)
    }

    /// Known category names, sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut names: Vec<String> = self.filters.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Net number of items in a category's filter.
    pub fn items(&self, category: &str) -> u64 {
        self.filters
            .read()
            .get(category)
            .map(|f| f.items())
            .unwrap_or(0)
    }
}
