//! Per-call fetch policy.

use std::time::Duration;

/// Options for a single [`RequestCache::fetch`](super::RequestCache::fetch) call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// TTL applied if this call starts the operation; the cache default otherwise
    pub ttl: Option<Duration>,
    /// Skip the cache read but still join an in-flight operation
    pub force_refresh: bool,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the TTL from signed milliseconds. Zero or negative means always stale.
    pub fn with_ttl_ms(self, ttl_ms: i64) -> Self {
        let ms = u64::try_from(ttl_ms).unwrap_or(0);
        self.with_ttl(Duration::from_millis(ms))
    }

    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = FetchOptions::new();
        assert_eq!(options.ttl, None);
        assert!(!options.force_refresh);
    }

    #[test]
    fn test_negative_ttl_clamps_to_zero() {
        let options = FetchOptions::new().with_ttl_ms(-50);
        assert_eq!(options.ttl, Some(Duration::ZERO));
    }

    #[test]
    fn test_builder_chain() {
        let options = FetchOptions::new().with_ttl_ms(120_000).force_refresh(true);
        assert_eq!(options.ttl, Some(Duration::from_secs(120)));
        assert!(options.force_refresh);
    }
}
