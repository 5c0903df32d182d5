//! Cache store port.
//!
//! A key/value slot store with per-entry time-to-live. Payloads are opaque
//! bytes; the store knows nothing about what invalidates them.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::errors::DomainResult;

/// Key/value store with per-entry expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Return the payload under `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> DomainResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value. The entry
    /// expires `ttl` after this call.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> DomainResult<()>;

    /// Remove any value under `key`. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> DomainResult<()>;
}
