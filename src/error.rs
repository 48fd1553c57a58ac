//! Error types for the request cache and the gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::upstream::UpstreamError;

// == Fetch Error ==
/// Error returned by [`RequestCache::fetch`](crate::cache::RequestCache::fetch).
///
/// `Clone` so that every waiter on a shared operation receives the same error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError<E> {
    /// The cache key was empty
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    /// The operation itself failed; the error is passed through untouched
    #[error("{0}")]
    Operation(E),

    /// The operation panicked or its task was cancelled
    #[error("Operation panicked: {0}")]
    Panicked(String),
}

// == Gateway Error Enum ==
/// Error type for the HTTP gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The upstream backend could not serve the request
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FetchError<UpstreamError>> for GatewayError {
    fn from(err: FetchError<UpstreamError>) -> Self {
        match err {
            FetchError::InvalidKey(msg) => GatewayError::InvalidRequest(msg),
            FetchError::Operation(err) => GatewayError::Upstream(err),
            FetchError::Panicked(msg) => GatewayError::Internal(msg),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Upstream(UpstreamError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the gateway.
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_error_displays_inner() {
        let err: FetchError<String> = FetchError::Operation("network down".to_string());
        assert_eq!(err.to_string(), "network down");
    }

    #[test]
    fn test_panicked_display() {
        let err: FetchError<String> = FetchError::Panicked("index out of bounds".to_string());
        assert_eq!(err.to_string(), "Operation panicked: index out of bounds");
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (GatewayError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                GatewayError::Upstream(UpstreamError::Timeout(100)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                GatewayError::Upstream(UpstreamError::Network("refused".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (GatewayError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_fetch_error_conversion() {
        let err: GatewayError = FetchError::InvalidKey("empty".to_string()).into();
        assert!(matches!(err, GatewayError::InvalidRequest(_)));

        let err: GatewayError =
            FetchError::Operation(UpstreamError::Decode("bad json".into())).into();
        assert!(matches!(err, GatewayError::Upstream(UpstreamError::Decode(_))));

        let err: GatewayError = FetchError::<UpstreamError>::Panicked("boom".into()).into();
        assert!(matches!(err, GatewayError::Internal(_)));
    }
}
