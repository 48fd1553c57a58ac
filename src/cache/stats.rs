//! Cache Statistics Module
//!
//! Tracks hits, misses, coalesced waiters and failed operations.

use serde::Serialize;

// == Cache Stats ==
/// Request cache counters.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CacheStats {
    /// Fetches answered from a fresh entry
    pub hits: u64,
    /// Fetches that could not be answered from the cache
    pub misses: u64,
    /// Fetches that joined an operation already in flight
    pub coalesced: u64,
    /// Operations that settled with an error
    pub failures: u64,
    /// Stale entries removed on read or by a sweep
    pub stale_evictions: u64,
    /// Current number of stored entries
    pub total_entries: usize,
    /// Current number of in-flight operations
    pub pending: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing was fetched yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// A miss that was routed into an existing in-flight operation.
    pub fn record_coalesced(&mut self) {
        self.misses += 1;
        self.coalesced += 1;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn record_stale_evictions(&mut self, count: usize) {
        self.stale_evictions += count as u64;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.coalesced, 0);
        assert_eq!(stats.failures, 0);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_coalesced_counts_as_miss() {
        let mut stats = CacheStats::new();
        stats.record_miss();
        stats.record_coalesced();
        stats.record_coalesced();
        assert_eq!(stats.misses, 3);
        assert_eq!(stats.coalesced, 2);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_record_stale_evictions() {
        let mut stats = CacheStats::new();
        stats.record_stale_evictions(2);
        stats.record_stale_evictions(0);
        stats.record_stale_evictions(1);
        assert_eq!(stats.stale_evictions, 3);
    }
}
