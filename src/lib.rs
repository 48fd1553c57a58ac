//! Fetch Cache - in-memory request cache with in-flight deduplication
//!
//! `RequestCache` answers repeated fetches from a TTL table and routes
//! concurrent misses for one key into a single shared operation. The crate
//! also ships a small HTTP gateway that caches a JSON backend through it.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod ops;
pub mod tasks;
pub mod upstream;

pub use api::AppState;
pub use cache::{CacheKey, CacheStats, FetchOptions, RequestCache};
pub use config::Config;
pub use error::FetchError;
pub use tasks::spawn_sweep_task;
