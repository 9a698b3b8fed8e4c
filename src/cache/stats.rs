//! Cache Statistics Module
//!
//! Tracks cache hits, cold reads, timer evictions and upstream traffic.

use serde::Serialize;

// == Cache Stats ==
/// Tracks per-cache counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Reads served from a cached full body
    pub hits: u64,
    /// Cold reads that went upstream
    pub misses: u64,
    /// Entries removed by the inactivity or lifetime timer
    pub evictions: u64,
    /// Upstream requests issued, including 501 fallbacks
    pub upstream_fetches: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads answered so far, cached or not.
    pub fn reads(&self) -> u64 {
        self.hits + self.misses
    }

    /// Share of reads served from memory, 0.0 before the first read.
    pub fn hit_rate(&self) -> f64 {
        match self.reads() {
            0 => 0.0,
            reads => self.hits as f64 / reads as f64,
        }
    }

    /// Upstream requests beyond one per cold read (501 fallbacks).
    pub fn extra_fetches(&self) -> u64 {
        self.upstream_fetches.saturating_sub(self.misses)
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub(crate) fn record_upstream_fetch(&mut self) {
        self.upstream_fetches += 1;
    }

    pub(crate) fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
