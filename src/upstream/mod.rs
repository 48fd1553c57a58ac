//! Upstream Module
//!
//! Client for the external JSON REST backend whose responses are cached.

mod client;

pub use client::{UpstreamClient, UpstreamConfig, UpstreamError};
