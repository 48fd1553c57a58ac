//! Request Cache Module
//!
//! Async front of the cache: answers fresh reads from the entry table and
//! coalesces concurrent misses into a single shared operation per key.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::cache::store::{CacheStore, Lookup, PendingFetch};
use crate::cache::{CacheStats, FetchOptions};
use crate::error::FetchError;

// == Request Cache ==
/// TTL cache with in-flight request deduplication.
///
/// Clones are handles to the same tables. Construct one at startup and pass
/// it to whatever needs it.
pub struct RequestCache<V, E> {
    store: Arc<Mutex<CacheStore<V, E>>>,
}

impl<V, E> Clone for RequestCache<V, E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<V, E> RequestCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + std::fmt::Display + 'static,
{
    // == Constructor ==
    /// Creates an empty cache whose fetches default to `default_ttl`.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            store: Arc::new(Mutex::new(CacheStore::new(default_ttl))),
        }
    }

    // == Fetch ==
    /// Returns the cached value for `key` or runs `operation` to produce it.
    ///
    /// A fresh entry is returned without calling `operation`. Otherwise, if
    /// an operation for `key` is already in flight, this call waits on it.
    /// Only when neither exists is `operation` invoked; its success is stored
    /// under the TTL from `options` (or the default) and its failure is
    /// handed to every waiter without being cached.
    pub async fn fetch<F, Fut>(
        &self,
        key: impl Into<String>,
        operation: F,
        options: FetchOptions,
    ) -> Result<V, FetchError<E>>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let key = key.into();
        if key.is_empty() {
            return Err(FetchError::InvalidKey("key must not be empty".to_string()));
        }

        let shared = {
            let mut store = self.store.lock().await;
            match store.lookup(&key, options.force_refresh, Instant::now()) {
                Lookup::Hit(value) => return Ok(value),
                Lookup::Join(pending) => pending,
                Lookup::Miss => {
                    let ttl = options.ttl.unwrap_or_else(|| store.default_ttl());
                    let pending = self.start(key.clone(), operation(), ttl);
                    store.register_pending(key, pending.clone());
                    pending
                }
            }
        };

        shared.await
    }

    /// Runs the operation on its own task and settles the tables when it ends.
    ///
    /// The task completes whether or not anyone is still waiting, and a
    /// panic inside the operation settles as [`FetchError::Panicked`].
    fn start<Fut>(&self, key: String, operation: Fut, ttl: Duration) -> PendingFetch<V, E>
    where
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        debug!(key = %key, ttl = ?ttl, "starting fetch");

        let task = tokio::spawn(async move {
            let result = match AssertUnwindSafe(operation).catch_unwind().await {
                Ok(result) => result.map_err(FetchError::Operation),
                Err(payload) => Err(FetchError::Panicked(panic_message(payload.as_ref()))),
            };
            store.lock().await.settle(&key, &result, ttl, Instant::now());
            result
        });

        async move {
            task.await
                .unwrap_or_else(|err| Err(FetchError::Panicked(err.to_string())))
        }
        .boxed()
        .shared()
    }

    // == Get ==
    /// Returns a fresh cached value without fetching. Stale entries are evicted.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.store.lock().await.fresh_value(key, Instant::now())
    }

    pub async fn contains_fresh(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }

    pub async fn is_pending(&self, key: &str) -> bool {
        self.store.lock().await.is_pending(key)
    }

    // == Clear ==
    /// Removes all entries, or those whose key contains `pattern`.
    ///
    /// In-flight operations are not affected. Returns the number removed.
    pub async fn clear(&self, pattern: Option<&str>) -> usize {
        let removed = self.store.lock().await.clear(pattern);
        debug!(pattern = pattern.unwrap_or("*"), removed, "cache cleared");
        removed
    }

    // == Sweep ==
    /// Removes every stale entry. Returns the number removed.
    pub async fn sweep_stale(&self) -> usize {
        self.store.lock().await.sweep_stale(Instant::now())
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.lock().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }

    pub async fn pending_len(&self) -> usize {
        self.store.lock().await.pending_len()
    }

    pub async fn default_ttl(&self) -> Duration {
        self.store.lock().await.default_ttl()
    }
}

/// Text of a panic payload, when it carries one.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "operation panicked".to_string()
    }
}
