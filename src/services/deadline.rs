//! Time bounds for store and cache round-trips.

use std::future::Future;
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};

/// Await `fut` for at most `limit`.
///
/// An elapsed deadline becomes the error built by `on_timeout`, so store
/// calls surface as `StoreUnavailable` and cache calls as `CacheUnavailable`.
pub async fn bounded<T, F>(
    limit: Duration,
    fut: F,
    on_timeout: fn(String) -> DomainError,
) -> DomainResult<T>
where
    F: Future<Output = DomainResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout(format!("timed out after {}ms", limit.as_millis()))),
    }
}
