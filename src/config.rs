//! Configuration Module
//!
//! Handles loading gateway configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::DEFAULT_TTL_MS;
use crate::ops::RetryPolicy;
use crate::upstream::UpstreamConfig;

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// TTL in milliseconds for fetches that do not pass one
    pub default_ttl_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the backend being cached
    pub upstream_base_url: String,
    /// Deadline for a single upstream attempt in milliseconds
    pub upstream_timeout_ms: u64,
    /// Retries for transient upstream failures
    pub upstream_max_retries: u32,
    /// First retry delay in milliseconds
    pub upstream_initial_backoff_ms: u64,
    /// Retry delay cap in milliseconds
    pub upstream_max_backoff_ms: u64,
    /// Stale-entry sweep interval in seconds, 0 disables the sweep
    pub sweep_interval_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL_MS` - Default fetch TTL (default: 300000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `UPSTREAM_BASE_URL` - Backend base URL (default: http://127.0.0.1:8080)
    /// - `UPSTREAM_TIMEOUT_MS` - Per-attempt deadline (default: 15000)
    /// - `UPSTREAM_MAX_RETRIES` - Transient retries (default: 2)
    /// - `UPSTREAM_INITIAL_BACKOFF_MS` - First retry delay (default: 250)
    /// - `UPSTREAM_MAX_BACKOFF_MS` - Retry delay cap (default: 4000)
    /// - `SWEEP_INTERVAL_SECS` - Stale sweep interval, 0 = off (default: 0)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl_ms: env_or("DEFAULT_TTL_MS", defaults.default_ttl_ms),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            upstream_base_url: env::var("UPSTREAM_BASE_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.upstream_base_url),
            upstream_timeout_ms: env_or("UPSTREAM_TIMEOUT_MS", defaults.upstream_timeout_ms),
            upstream_max_retries: env_or("UPSTREAM_MAX_RETRIES", defaults.upstream_max_retries),
            upstream_initial_backoff_ms: env_or(
                "UPSTREAM_INITIAL_BACKOFF_MS",
                defaults.upstream_initial_backoff_ms,
            ),
            upstream_max_backoff_ms: env_or(
                "UPSTREAM_MAX_BACKOFF_MS",
                defaults.upstream_max_backoff_ms,
            ),
            sweep_interval_secs: env_or("SWEEP_INTERVAL_SECS", defaults.sweep_interval_secs),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    /// Sweep interval, or None when the sweep is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }

    /// Settings for the upstream client.
    pub fn upstream(&self) -> UpstreamConfig {
        UpstreamConfig {
            base_url: self.upstream_base_url.clone(),
            timeout: Duration::from_millis(self.upstream_timeout_ms),
            retry: RetryPolicy::new(
                self.upstream_max_retries,
                Duration::from_millis(self.upstream_initial_backoff_ms),
                Duration::from_millis(self.upstream_max_backoff_ms),
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl_ms: DEFAULT_TTL_MS,
            server_port: 3000,
            upstream_base_url: "http://127.0.0.1:8080".to_string(),
            upstream_timeout_ms: 15_000,
            upstream_max_retries: 2,
            upstream_initial_backoff_ms: 250,
            upstream_max_backoff_ms: 4_000,
            sweep_interval_secs: 0,
        }
    }
}

/// Parses `name` from the environment, falling back on absence or bad input.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
