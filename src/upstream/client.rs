//! Upstream JSON client
//!
//! Thin reqwest wrapper for GET requests against the backend REST API,
//! with a per-attempt deadline and retry on transient failures.

use std::time::Duration;

use reqwest::Client as ReqwestClient;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::ops::{with_timeout, OpError, RetryPolicy, Transient};

// == Upstream Error ==
/// Failure talking to the backend.
///
/// Carries only owned strings so it can be cloned to every waiter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    /// Connection or protocol failure
    #[error("Upstream unreachable: {0}")]
    Network(String),

    /// No response within the deadline (milliseconds)
    #[error("Upstream timed out after {0}ms")]
    Timeout(u64),

    /// Non-success HTTP status
    #[error("Upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not valid JSON
    #[error("Upstream sent invalid JSON: {0}")]
    Decode(String),
}

impl Transient for UpstreamError {
    fn is_transient(&self) -> bool {
        match self {
            UpstreamError::Network(_) | UpstreamError::Timeout(_) => true,
            UpstreamError::Status { status, .. } => *status == 429 || *status >= 500,
            UpstreamError::Decode(_) => false,
        }
    }
}

impl From<OpError<UpstreamError>> for UpstreamError {
    fn from(err: OpError<UpstreamError>) -> Self {
        match err {
            OpError::TimedOut(limit) => UpstreamError::Timeout(millis(limit)),
            OpError::Failed(err) => err,
        }
    }
}

fn millis(limit: Duration) -> u64 {
    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)
}

// == Upstream Config ==
/// Settings for the backend client.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL, e.g. `http://127.0.0.1:8080/api`
    pub base_url: String,
    /// Deadline for a single attempt
    pub timeout: Duration,
    /// Retry policy for transient failures
    pub retry: RetryPolicy,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout: Duration::from_secs(15),
            retry: RetryPolicy::default(),
        }
    }
}

// == Upstream Client ==
/// HTTP client for the backend. Cheap to clone.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http_client: ReqwestClient,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl UpstreamClient {
    /// Builds the client.
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let http_client = ReqwestClient::builder()
            .pool_max_idle_per_host(10)
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            retry: config.retry,
        })
    }

    /// Full URL for a path relative to the base URL.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // == Get JSON ==
    /// GETs `path` and decodes the body as JSON, retrying transient failures.
    #[instrument(skip(self))]
    pub async fn get_json(&self, path: &str) -> Result<Value, UpstreamError> {
        let url = self.url_for(path);
        let (client, url) = (self, url.as_str());
        self.retry
            .execute(|| async move {
                with_timeout(client.timeout, client.get_once(url))
                    .await
                    .map_err(UpstreamError::from)
            })
            .await
    }

    async fn get_once(&self, url: &str) -> Result<Value, UpstreamError> {
        debug!(url, "upstream GET");
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.transport_error(e)
                } else {
                    UpstreamError::Decode(e.to_string())
                }
            })
    }

    /// The builder deadline surfaces as a reqwest error; keep it a timeout.
    fn transport_error(&self, err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout(millis(self.timeout))
        } else {
            UpstreamError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> UpstreamClient {
        UpstreamClient::new(UpstreamConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_url_joining() {
        let client = client("http://backend/api/");
        assert_eq!(client.url_for("comments/42"), "http://backend/api/comments/42");
        assert_eq!(client.url_for("/comments/42"), "http://backend/api/comments/42");
    }

    #[test]
    fn test_transient_classification() {
        assert!(UpstreamError::Network("reset".into()).is_transient());
        assert!(UpstreamError::Timeout(10).is_transient());
        assert!(UpstreamError::Status { status: 503, body: String::new() }.is_transient());
        assert!(UpstreamError::Status { status: 429, body: String::new() }.is_transient());
        assert!(!UpstreamError::Status { status: 404, body: String::new() }.is_transient());
        assert!(!UpstreamError::Decode("eof".into()).is_transient());
    }

    #[test]
    fn test_timeout_conversion() {
        let err: UpstreamError = OpError::TimedOut(Duration::from_millis(1500)).into();
        assert_eq!(err, UpstreamError::Timeout(1500));

        let err: UpstreamError = OpError::TimedOut(Duration::MAX).into();
        assert_eq!(err, UpstreamError::Timeout(u64::MAX));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let client = UpstreamClient::new(UpstreamConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout: Duration::from_secs(2),
            retry: RetryPolicy::none(),
        })
        .unwrap();

        let result = client.get_json("anything").await;
        assert!(matches!(result, Err(UpstreamError::Network(_))));
    }
}
