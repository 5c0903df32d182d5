//! Null cache store implementation.
//!
//! Used when aggregate caching is disabled: every read falls through to the store.

use async_trait::async_trait;
use std::time::Duration;

use super::CacheStore;
use crate::domain::errors::DomainResult;

/// A cache store that never holds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCacheStore;

impl NullCacheStore {
    /// Cache that stores nothing.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheStore for NullCacheStore {
    async fn get(&self, _key: &str) -> DomainResult<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> DomainResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> DomainResult<()> {
        Ok(())
    }
}
