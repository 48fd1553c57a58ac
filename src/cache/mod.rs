//! Cache Module
//!
//! In-memory request cache with TTL freshness and in-flight deduplication.
//!
//! The entry and pending tables are only reachable through [`RequestCache`],
//! whose lock keeps check-then-act atomic:
//!
//! ```compile_fail
//! use fetch_cache::cache::CacheStore;
//! ```

mod entry;
mod key;
mod options;
mod request_cache;
mod stats;
mod store;


// Re-export public types
pub use key::CacheKey;
pub use options::FetchOptions;
pub use request_cache::RequestCache;
pub use stats::CacheStats;

// Table internals stay behind RequestCache's lock
pub(crate) use entry::CacheEntry;
pub(crate) use store::{CacheStore, Lookup};

// == Public Constants ==
/// Default TTL when neither the caller nor the configuration sets one
pub const DEFAULT_TTL_MS: u64 = 5 * 60 * 1000;
