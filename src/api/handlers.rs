//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::cache::{CacheKey, RequestCache};
use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::models::{
    ClearQuery, ClearResponse, FetchQuery, FetchResponse, HealthResponse, StatsResponse,
};
use crate::upstream::{UpstreamClient, UpstreamError};

/// Entity segment of every key the gateway stores.
pub const UPSTREAM_ENTITY: &str = "upstream";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Request cache for upstream JSON responses
    pub cache: RequestCache<Value, UpstreamError>,
    /// Backend client
    pub upstream: UpstreamClient,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(cache: RequestCache<Value, UpstreamError>, upstream: UpstreamClient) -> Self {
        Self { cache, upstream }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> std::result::Result<Self, UpstreamError> {
        let cache = RequestCache::new(config.default_ttl());
        let upstream = UpstreamClient::new(config.upstream())?;
        Ok(Self::new(cache, upstream))
    }
}

/// Cache key for an upstream path.
pub fn upstream_key(path: &str) -> String {
    CacheKey::new(UPSTREAM_ENTITY).id(path).into()
}

/// Handler for GET /fetch/*path
///
/// Returns the upstream JSON for `path`, served from cache while fresh.
/// Concurrent requests for the same path share one upstream call.
pub async fn fetch_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<FetchQuery>,
) -> Result<Json<FetchResponse>> {
    let path = path.trim_start_matches('/').to_string();
    if path.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "Upstream path cannot be empty".to_string(),
        ));
    }

    let key = upstream_key(&path);
    let client = state.upstream.clone();
    let value = state
        .cache
        .fetch(
            key.as_str(),
            move || async move { client.get_json(&path).await },
            query.to_options(),
        )
        .await?;

    Ok(Json(FetchResponse::new(key, value)))
}

/// Handler for DELETE /cache
///
/// Clears every cached response, or those whose key contains `pattern`.
pub async fn clear_handler(
    State(state): State<AppState>,
    Query(query): Query<ClearQuery>,
) -> Json<ClearResponse> {
    let pattern = query.pattern();
    let removed = state.cache.clear(pattern).await;

    Json(ClearResponse::new(removed, pattern))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().await.into())
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
