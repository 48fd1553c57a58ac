//! Operation Helpers Module
//!
//! Timeout and retry wrappers for the operations passed to the request cache.
//! The cache never applies these itself; callers compose them into the
//! operation they hand over.

mod retry;
mod timeout;

pub use retry::{RetryPolicy, Transient};
pub use timeout::{with_timeout, OpError};
