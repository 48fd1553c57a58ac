//! Request DTOs for the gateway API
//!
//! Defines the query parameters accepted by the endpoints.

use serde::Deserialize;

use crate::cache::FetchOptions;

/// Query parameters for GET /fetch/*path
///
/// # Fields
/// - `ttl_ms`: Optional TTL override in milliseconds (zero or negative: always stale)
/// - `force_refresh`: Bypass a fresh cached value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchQuery {
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl_ms: Option<i64>,
    /// Skip the cache read
    #[serde(default)]
    pub force_refresh: bool,
}

impl FetchQuery {
    /// Converts the query into cache fetch options.
    pub fn to_options(&self) -> FetchOptions {
        let options = FetchOptions::new().force_refresh(self.force_refresh);
        match self.ttl_ms {
            Some(ttl_ms) => options.with_ttl_ms(ttl_ms),
            None => options,
        }
    }
}

/// Query parameters for DELETE /cache
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearQuery {
    /// Remove only keys containing this substring
    #[serde(default)]
    pub pattern: Option<String>,
}

impl ClearQuery {
    /// Pattern to clear by; an empty pattern counts as none.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref().filter(|p| !p.is_empty())
    }
}
