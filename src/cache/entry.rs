//! Cache Entry Module
//!
//! Defines a single cached fetch result with its TTL window.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A successfully fetched value together with the time it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The fetched value
    pub value: V,
    /// Monotonic time at which the fetch completed
    pub stored_at: Instant,
    /// How long the value stays fresh
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry with an explicit store time.
    pub fn stored_at(value: V, stored_at: Instant, ttl: Duration) -> Self {
        Self {
            value,
            stored_at,
            ttl,
        }
    }

    // == Freshness ==
    /// Returns true while `now - stored_at < ttl`.
    ///
    /// A zero TTL is never fresh.
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < self.ttl
    }
}
