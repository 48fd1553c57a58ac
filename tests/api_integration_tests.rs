//! Integration Tests for API Endpoints
//!
//! Drives the gateway router against a throwaway backend that counts hits.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    routing::get,
    Json, Router,
};
use fetch_cache::{
    api::create_router,
    ops::RetryPolicy,
    upstream::{UpstreamClient, UpstreamConfig},
    AppState, RequestCache,
};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Functions ==

#[derive(Clone, Default)]
struct Backend {
    hits: Arc<AtomicUsize>,
    flaky_failures: Arc<AtomicUsize>,
}

async fn comments(State(backend): State<Backend>, Path(id): Path<u64>) -> Json<Value> {
    let n = backend.hits.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({ "content_id": id, "version": n }))
}

async fn slow(State(backend): State<Backend>) -> Json<Value> {
    backend.hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(200)).await;
    Json(json!({ "slow": true }))
}

async fn missing(State(backend): State<Backend>) -> (StatusCode, &'static str) {
    backend.hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::NOT_FOUND, "no such post")
}

async fn flaky(State(backend): State<Backend>) -> Result<Json<Value>, StatusCode> {
    backend.hits.fetch_add(1, Ordering::SeqCst);
    if backend.flaky_failures.fetch_add(1, Ordering::SeqCst) < 1 {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    } else {
        Ok(Json(json!({ "recovered": true })))
    }
}

/// Starts the fake backend on an ephemeral port and returns its base URL.
async fn spawn_backend(backend: Backend) -> String {
    let app = Router::new()
        .route("/comments/:id", get(comments))
        .route("/slow", get(slow))
        .route("/missing", get(missing))
        .route("/flaky", get(flaky))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn create_test_app(backend: Backend) -> Router {
    create_test_app_with(
        backend,
        Duration::from_secs(5),
        RetryPolicy::new(2, Duration::from_millis(10), Duration::from_millis(50)),
    )
    .await
}

async fn create_test_app_with(backend: Backend, timeout: Duration, retry: RetryPolicy) -> Router {
    let base_url = spawn_backend(backend).await;
    let upstream = UpstreamClient::new(UpstreamConfig {
        base_url,
        timeout,
        retry,
    })
    .unwrap();
    let state = AppState::new(RequestCache::new(Duration::from_secs(300)), upstream);
    create_router(state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// == Fetch Endpoint Tests ==

#[tokio::test]
async fn test_fetch_endpoint_success() {
    let backend = Backend::default();
    let app = create_test_app(backend.clone()).await;

    let (status, json) = send(&app, "GET", "/fetch/comments/42").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "upstream:comments/42");
    assert_eq!(json["value"]["content_id"], 42);
    assert_eq!(backend.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_repeated_fetch_served_from_cache() {
    let backend = Backend::default();
    let app = create_test_app(backend.clone()).await;

    let (_, first) = send(&app, "GET", "/fetch/comments/42").await;
    let (_, second) = send(&app, "GET", "/fetch/comments/42").await;

    assert_eq!(first["value"]["version"], 1);
    assert_eq!(second["value"]["version"], 1);
    assert_eq!(backend.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_force_refresh_reaches_backend() {
    let backend = Backend::default();
    let app = create_test_app(backend.clone()).await;

    send(&app, "GET", "/fetch/comments/7").await;
    let (_, json) = send(&app, "GET", "/fetch/comments/7?force_refresh=true").await;

    assert_eq!(json["value"]["version"], 2);
    assert_eq!(backend.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_zero_ttl_never_cached() {
    let backend = Backend::default();
    let app = create_test_app(backend.clone()).await;

    send(&app, "GET", "/fetch/comments/7?ttl_ms=0").await;
    send(&app, "GET", "/fetch/comments/7?ttl_ms=0").await;

    assert_eq!(backend.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_concurrent_fetches_hit_backend_once() {
    let backend = Backend::default();
    let app = create_test_app(backend.clone()).await;

    let (a, b, c) = tokio::join!(
        send(&app, "GET", "/fetch/slow"),
        send(&app, "GET", "/fetch/slow"),
        send(&app, "GET", "/fetch/slow"),
    );

    for (status, json) in [a, b, c] {
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["value"]["slow"], true);
    }
    assert_eq!(backend.hits.load(Ordering::SeqCst), 1);

    let (_, stats) = send(&app, "GET", "/stats").await;
    assert_eq!(stats["coalesced"], 2);
}

#[tokio::test]
async fn test_upstream_error_not_cached() {
    let backend = Backend::default();
    let app = create_test_app(backend.clone()).await;

    let (status, json) = send(&app, "GET", "/fetch/missing").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json["error"].as_str().unwrap().contains("404"));

    send(&app, "GET", "/fetch/missing").await;
    // 404 is permanent: one backend hit per request, no retries, no caching
    assert_eq!(backend.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_transient_upstream_error_retried() {
    let backend = Backend::default();
    let app = create_test_app(backend.clone()).await;

    let (status, json) = send(&app, "GET", "/fetch/flaky").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"]["recovered"], true);
    assert_eq!(backend.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_slow_upstream_is_gateway_timeout() {
    let backend = Backend::default();
    let app = create_test_app_with(
        backend.clone(),
        Duration::from_millis(50),
        RetryPolicy::none(),
    )
    .await;

    let (status, json) = send(&app, "GET", "/fetch/slow").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(json["error"].as_str().unwrap().contains("timed out after 50ms"));
    assert_eq!(backend.hits.load(Ordering::SeqCst), 1);

    let (_, stats) = send(&app, "GET", "/stats").await;
    assert_eq!(stats["total_entries"], 0);
    assert_eq!(stats["pending"], 0);
    assert_eq!(stats["failures"], 1);
}

// == Cache Endpoint Tests ==

#[tokio::test]
async fn test_clear_by_pattern_forces_refetch() {
    let backend = Backend::default();
    let app = create_test_app(backend.clone()).await;

    send(&app, "GET", "/fetch/comments/1").await;
    send(&app, "GET", "/fetch/comments/2").await;
    send(&app, "GET", "/fetch/slow").await;
    assert_eq!(backend.hits.load(Ordering::SeqCst), 3);

    let (status, json) = send(&app, "DELETE", "/cache?pattern=comments").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 2);
    assert_eq!(json["pattern"], "comments");

    send(&app, "GET", "/fetch/slow").await;
    assert_eq!(backend.hits.load(Ordering::SeqCst), 3);

    send(&app, "GET", "/fetch/comments/1").await;
    assert_eq!(backend.hits.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_clear_all() {
    let backend = Backend::default();
    let app = create_test_app(backend.clone()).await;

    send(&app, "GET", "/fetch/comments/1").await;
    let (status, json) = send(&app, "DELETE", "/cache").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 1);
    assert!(json["pattern"].is_null());
}

// == Stats / Health Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint_tracks_hits_and_misses() {
    let backend = Backend::default();
    let app = create_test_app(backend).await;

    send(&app, "GET", "/fetch/comments/3").await;
    send(&app, "GET", "/fetch/comments/3").await;
    send(&app, "GET", "/fetch/comments/3").await;

    let (status, json) = send(&app, "GET", "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hits"], 2);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["total_entries"], 1);
    assert_eq!(json["pending"], 0);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(Backend::default()).await;

    let (status, json) = send(&app, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
