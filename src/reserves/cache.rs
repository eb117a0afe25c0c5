//! Explicit memoization of reserve estimates
//!
//! Results are keyed by (dataset version, method, configuration
//! fingerprint), so a replaced dataset snapshot or changed configuration can
//! never be served a stale estimate. The cache is an ordinary value owned by
//! the caller, not ambient global state.

use crate::error::Result;
use crate::reserves::types::{ReserveEstimate, ReserveMethod};
use std::collections::HashMap;

/// Cache key identifying one calculation exactly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Version of the dataset snapshot the estimate was computed from
    pub dataset_version: u64,
    /// Reserving method
    pub method: ReserveMethod,
    /// Fingerprint of the engine configuration (see `EngineConfig::fingerprint`)
    pub config_fingerprint: u64,
}

/// Memoization store for computed reserve estimates
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: HashMap<CacheKey, ReserveEstimate>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a previously computed estimate
    pub fn get(&self, key: &CacheKey) -> Option<&ReserveEstimate> {
        self.entries.get(key)
    }

    /// Return the cached estimate for `key`, computing and storing it on a
    /// miss. A failed computation is not cached, so a corrected dataset
    /// under a new version recomputes cleanly.
    pub fn get_or_compute<F>(&mut self, key: CacheKey, compute: F) -> Result<ReserveEstimate>
    where
        F: FnOnce() -> Result<ReserveEstimate>,
    {
        if let Some(cached) = self.entries.get(&key) {
            log::debug!(
                "cache hit: {} v{} cfg {:x}",
                key.method.as_str(),
                key.dataset_version,
                key.config_fingerprint
            );
            return Ok(cached.clone());
        }
        let estimate = compute()?;
        self.entries.insert(key, estimate.clone());
        Ok(estimate)
    }

    /// Drop all cached results
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached estimates
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
