//! Deadline wrapper for operations handed to the cache.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Failure of a wrapped operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpError<E> {
    /// The deadline passed before the operation settled
    #[error("operation timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),

    /// The operation settled with its own error
    #[error("{0}")]
    Failed(E),
}

/// Runs `operation`, giving up once `limit` has elapsed.
pub async fn with_timeout<T, E, Fut>(limit: Duration, operation: Fut) -> Result<T, OpError<E>>
where
    Fut: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result.map_err(OpError::Failed),
        Err(_) => Err(OpError::TimedOut(limit)),
    }
}
