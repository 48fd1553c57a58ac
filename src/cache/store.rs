//! Cache Store Module
//!
//! Synchronous tables behind the request cache: fresh entries, in-flight
//! operations and statistics. Every method runs without suspending, so a
//! caller holding the lock performs check-then-act atomically.

use std::collections::HashMap;
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats};
use crate::error::FetchError;

/// Shared handle to an in-flight operation; every clone yields the same result.
pub type PendingFetch<V, E> = Shared<BoxFuture<'static, Result<V, FetchError<E>>>>;

/// Outcome of the synchronous part of a fetch.
pub enum Lookup<V, E> {
    /// A fresh value was found
    Hit(V),
    /// An operation for the key is already running
    Join(PendingFetch<V, E>),
    /// Nothing usable; the caller must start the operation
    Miss,
}

// == Cache Store ==
/// Entry and pending tables with their counters.
pub struct CacheStore<V, E> {
    /// Stored fetch results
    entries: HashMap<String, CacheEntry<V>>,
    /// At most one in-flight operation per key
    pending: HashMap<String, PendingFetch<V, E>>,
    /// Performance statistics
    stats: CacheStats,
    /// TTL used when a fetch does not specify one
    default_ttl: Duration,
}

impl<V: Clone, E: Clone> CacheStore<V, E> {
    // == Constructor ==
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            pending: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Lookup ==
    /// Decides how a fetch for `key` proceeds and records the matching counter.
    ///
    /// With `force_refresh` the entry table is not consulted, but an
    /// in-flight operation is still joined.
    pub fn lookup(&mut self, key: &str, force_refresh: bool, now: Instant) -> Lookup<V, E> {
        if !force_refresh {
            if let Some(value) = self.fresh_value(key, now) {
                self.stats.record_hit();
                debug!(key, "cache hit");
                return Lookup::Hit(value);
            }
        }

        if let Some(pending) = self.pending.get(key) {
            self.stats.record_coalesced();
            debug!(key, "joining in-flight fetch");
            return Lookup::Join(pending.clone());
        }

        self.stats.record_miss();
        debug!(key, force_refresh, "cache miss");
        Lookup::Miss
    }

    // == Fresh Value ==
    /// Returns a clone of the value if fresh; a stale entry is evicted.
    pub fn fresh_value(&mut self, key: &str, now: Instant) -> Option<V> {
        let entry = self.entries.get(key)?;
        if entry.is_fresh_at(now) {
            return Some(entry.value.clone());
        }

        self.entries.remove(key);
        self.stats.record_stale_evictions(1);
        debug!(key, "evicted stale entry on read");
        None
    }

    // == Pending ==
    /// Registers the operation started for `key`.
    pub fn register_pending(&mut self, key: String, fetch: PendingFetch<V, E>) {
        self.pending.insert(key, fetch);
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.contains_key(key)
    }

    // == Settle ==
    /// Records the outcome of the operation for `key`.
    ///
    /// The pending entry is always removed. Only a success is stored.
    pub fn settle(&mut self, key: &str, result: &Result<V, FetchError<E>>, ttl: Duration, now: Instant)
    where
        E: std::fmt::Display,
    {
        self.pending.remove(key);

        match result {
            Ok(value) => {
                self.entries
                    .insert(key.to_string(), CacheEntry::stored_at(value.clone(), now, ttl));
                debug!(key, ttl = ?ttl, "stored fetch result");
            }
            Err(err) => {
                self.stats.record_failure();
                warn!(key, error = %err, "fetch failed, nothing cached");
            }
        }
    }

    // == Clear ==
    /// Removes every entry, or only keys containing `pattern`.
    ///
    /// Pending operations are left to settle. Returns the number removed.
    pub fn clear(&mut self, pattern: Option<&str>) -> usize {
        let before = self.entries.len();
        match pattern {
            Some(pattern) => self.entries.retain(|key, _| !key.contains(pattern)),
            None => self.entries.clear(),
        }
        before - self.entries.len()
    }

    // == Sweep Stale ==
    /// Removes all stale entries. Returns the number removed.
    pub fn sweep_stale(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh_at(now));
        let removed = before - self.entries.len();
        self.stats.record_stale_evictions(removed);
        removed
    }

    // == Stats ==
    /// Returns current counters with up-to-date gauges.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats.pending = self.pending.len();
        stats
    }

    /// Number of stored entries, fresh or not yet found stale.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
