//! Counting Bloom filter.

use crate::{FilterError, FilterResult};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

/// Sizing parameters for a [`CountingFilter`].
#[derive(Debug, Clone, Copy)]
pub struct FilterConfig {
    /// Expected number of items.
    pub capacity: usize,
    /// Target false-positive rate at capacity (0 < p < 1).
    pub fp_rate: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            fp_rate: 0.01,
        }
    }
}

impl FilterConfig {
    /// Validate the parameters.
    pub fn validate(&self) -> FilterResult<()> {
        if self.capacity == 0 {
            return Err(FilterError::InvalidConfig("capacity must be > 0".into()));
        }
        if !(self.fp_rate > 0.0 && self.fp_rate < 1.0) {
            return Err(FilterError::InvalidConfig(format!(
                "fp_rate must be in (0, 1), got {}",
                self.fp_rate
            )));
        }
        Ok(())
    }
}

/// A counting Bloom filter with a fixed backing array.
///
/// Sized once at creation from a [`FilterConfig`]; there is no resize or
/// rehash path. Exceeding the configured capacity degrades the
/// false-positive rate but is not an error. Counters are `u8`; an `add`
/// that would overflow one fails instead of corrupting later deletes.
///
/// Index positions come from double hashing: a Blake2b256 digest of the
/// item is split into two 64-bit halves `h1`, `h2`, and probe `i` lands at
/// `(h1 + i * h2) mod m`.
#[derive(Debug, Clone)]
pub struct CountingFilter {
    counters: Vec<u8>,
    hashes: u32,
    items: u64,
}

impl CountingFilter {
    /// Create a filter sized for the given configuration.
    ///
    /// `m = ceil(-n * ln p / ln^2 2)` counters and
    /// `k = max(1, round(m/n * ln 2))` probes.
    pub fn new(config: FilterConfig) -> FilterResult<Self> {
        config.validate()?;
        let n = config.capacity as f64;
        let ln2 = std::f64::consts::LN_2;
        let m = (-n * config.fp_rate.ln() / (ln2 * ln2)).ceil() as usize;
        let k = ((m as f64 / n) * ln2).round().max(1.0) as u32;
        Ok(Self {
            counters: vec![0u8; m.max(1)],
            hashes: k,
            items: 0,
        })
    }

    fn probes(&self, data: &[u8]) -> impl Iterator<Item = usize> + '_ {
        let digest = Blake2b256::digest(data);
        let h1 = u64::from_be_bytes(digest[0..8].try_into().expect("digest is 32 bytes"));
        let h2 = u64::from_be_bytes(digest[8..16].try_into().expect("digest is 32 bytes"));
        let m = self.counters.len() as u64;
        (0..self.hashes as u64).map(move |i| (h1.wrapping_add(i.wrapping_mul(h2)) % m) as usize)
    }

    /// Add an item. Idempotent with respect to observable membership: if
    /// the item already reads as present this is a no-op success.
    pub fn add(&mut self, data: &[u8]) -> FilterResult<()> {
        if self.lookup(data).0 {
            return Ok(());
        }
        let positions: Vec<usize> = self.probes(data).collect();
        if positions.iter().any(|&p| self.counters[p] == u8::MAX) {
            return Err(FilterError::CounterSaturated);
        }
        for p in positions {
            self.counters[p] += 1;
        }
        self.items += 1;
        Ok(())
    }

    /// Test membership. Returns `(found, count)` where `count` is the
    /// minimum counter across the item's positions — an upper bound on how
    /// many times items hashing there were added.
    pub fn lookup(&self, data: &[u8]) -> (bool, u8) {
        let mut min = u8::MAX;
        for p in self.probes(data) {
            if self.counters[p] == 0 {
                return (false, 0);
            }
            min = min.min(self.counters[p]);
        }
        (true, min)
    }

    /// Remove an item. Decrements only if the item currently reads as
    /// present; returns whether anything was removed.
    pub fn delete(&mut self, data: &[u8]) -> bool {
        if !self.lookup(data).0 {
            return false;
        }
        let positions: Vec<usize> = self.probes(data).collect();
        for p in positions {
            self.counters[p] = self.counters[p].saturating_sub(1);
        }
        self.items = self.items.saturating_sub(1);
        true
    }

    /// Number of distinct items added (net of deletes).
    pub fn items(&self) -> u64 {
        self.items
    }

    /// Number of counters in the backing array.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Whether nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.items == 0
    }
}
