//! Stale Sweep Task
//!
//! Background task that periodically drops stale cache entries. Without it,
//! stale entries are only removed when read or cleared.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::RequestCache;

/// Spawns a background task that removes stale entries every `interval`.
///
/// In-flight operations are untouched. The returned handle is aborted during
/// graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache: RequestCache<Value, UpstreamError> = RequestCache::new(ttl);
/// let sweep_handle = spawn_sweep_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<V, E>(cache: RequestCache<V, E>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + std::fmt::Display + 'static,
{
    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            "Starting stale sweep task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.sweep_stale().await;
            if removed > 0 {
                info!("Stale sweep: removed {} entries", removed);
            } else {
                debug!("Stale sweep: nothing to remove");
            }
        }
    })
}
