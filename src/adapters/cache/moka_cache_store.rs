//! `CacheStore` backed by a moka future cache.
//!
//! Each entry records the TTL it was stored with; the expiry policy applies
//! it on insert and restarts it when the key is overwritten. Reads never
//! extend an entry's lifetime. moka refuses to return expired entries even
//! before they are physically evicted, so an expired key reads as absent.

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::errors::DomainResult;
use crate::domain::ports::CacheStore;

/// Default maximum number of cached entries.
const DEFAULT_MAX_CAPACITY: u64 = 16;

#[derive(Clone)]
struct CacheEntry {
    payload: Arc<Vec<u8>>,
    ttl: Duration,
}

/// Expiry policy reading the TTL stored alongside each entry.
struct PerEntryTtl;

impl Expiry<String, CacheEntry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &CacheEntry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process TTL cache.
#[derive(Clone)]
pub struct MokaCacheStore {
    inner: Cache<String, CacheEntry>,
}

impl MokaCacheStore {
    /// Store holding at most `max_capacity` entries.
    pub fn new(max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { inner }
    }
}

impl Default for MokaCacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CAPACITY)
    }
}

#[async_trait]
impl CacheStore for MokaCacheStore {
    async fn get(&self, key: &str) -> DomainResult<Option<Vec<u8>>> {
        Ok(self.inner.get(key).await.map(|entry| entry.payload.as_ref().clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> DomainResult<()> {
        let entry = CacheEntry {
            payload: Arc::new(value),
            ttl,
        };
        self.inner.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> DomainResult<()> {
        self.inner.invalidate(key).await;
        Ok(())
    }
}
