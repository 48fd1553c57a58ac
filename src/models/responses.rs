//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Response body for GET /fetch/*path
#[derive(Debug, Clone, Serialize)]
pub struct FetchResponse {
    /// Cache key the value is stored under
    pub key: String,
    /// Upstream JSON payload
    pub value: Value,
}

impl FetchResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Number of entries removed
    pub removed: usize,
    /// Pattern that was applied, absent for a full clear
    pub pattern: Option<String>,
}

impl ClearResponse {
    pub fn new(removed: usize, pattern: Option<&str>) -> Self {
        Self {
            removed,
            pattern: pattern.map(str::to_string),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Fetches answered from cache
    pub hits: u64,
    /// Fetches not answered from cache
    pub misses: u64,
    /// Misses that joined an in-flight fetch
    pub coalesced: u64,
    /// Upstream fetches that failed
    pub failures: u64,
    /// Stale entries removed
    pub stale_evictions: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Fetches currently in flight
    pub pending: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            coalesced: stats.coalesced,
            failures: stats.failures,
            stale_evictions: stats.stale_evictions,
            total_entries: stats.total_entries,
            pending: stats.pending,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
