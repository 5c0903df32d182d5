//! Cached "latest reading per subject" aggregate.
//!
//! Reads go through the cache: a hit is served without touching the store,
//! a miss runs the full aggregation and repopulates the single cache slot.
//! Writers call [`LatestReadingService::on_subject_or_reading_written`]
//! after every successful persist, which deletes the slot; recomputation
//! only happens on the next read.
//!
//! Consistency is bounded staleness: if an invalidation is lost, or races a
//! read that repopulated the slot between a write's persist and its delete,
//! readers may see the old aggregate for at most one TTL. Concurrent misses
//! may all recompute and all set the slot; the computation is idempotent.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use super::deadline::bounded;
use super::latest_aggregator::latest_per_subject;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Config, LatestReadingRow};
use crate::domain::ports::{CacheStore, ReadingRepository};

/// Cache key shared by the read path and the invalidation hook.
pub const LATEST_READING_CACHE_KEY: &str = "last_reading_by_subject";

/// Default time-to-live of the cached aggregate.
pub const DEFAULT_AGGREGATE_TTL_SECS: u64 = 300;

const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_CACHE_TIMEOUT_MS: u64 = 250;

/// Tunables for [`LatestReadingService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateSettings {
    /// Lifetime of a populated cache slot
    pub ttl: Duration,
    /// Upper bound on the full store scan
    pub store_timeout: Duration,
    /// Upper bound on each cache get/set/delete
    pub cache_timeout: Duration,
}

impl Default for AggregateSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_AGGREGATE_TTL_SECS),
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            cache_timeout: Duration::from_millis(DEFAULT_CACHE_TIMEOUT_MS),
        }
    }
}

impl AggregateSettings {
    /// Settings taken from the `cache` and `database` config sections.
    pub fn from_config(config: &Config) -> Self {
        Self {
            ttl: Duration::from_secs(config.cache.ttl_secs),
            store_timeout: Duration::from_millis(config.database.query_timeout_ms),
            cache_timeout: Duration::from_millis(config.cache.timeout_ms),
        }
    }
}

/// Serves the latest reading of every subject through a single cache slot.
pub struct LatestReadingService<R: ReadingRepository> {
    readings: Arc<R>,
    cache: Arc<dyn CacheStore>,
    settings: AggregateSettings,
}

impl<R: ReadingRepository> LatestReadingService<R> {
    /// Service with default settings.
    pub fn new(readings: Arc<R>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            readings,
            cache,
            settings: AggregateSettings::default(),
        }
    }

    /// Replace the default settings.
    pub fn with_settings(mut self, settings: AggregateSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Current settings.
    pub fn settings(&self) -> AggregateSettings {
        self.settings
    }

    /// Most recent reading of every subject that has one, newest first.
    ///
    /// Cache failures and undecodable payloads are treated as misses. A store
    /// failure or timeout yields [`DomainError::RetrievalError`] and leaves the
    /// cache untouched.
    #[instrument(skip(self))]
    pub async fn latest_per_subject(&self) -> DomainResult<Vec<LatestReadingRow>> {
        if let Some(rows) = self.cached_rows().await {
            debug!(rows = rows.len(), "latest readings served from cache");
            return Ok(rows);
        }

        let scanned = bounded(
            self.settings.store_timeout,
            self.readings.scan_joined(),
            DomainError::StoreUnavailable,
        )
        .await
        .map_err(|e| {
            error!(error = %e, "latest reading scan failed");
            DomainError::RetrievalError(e.to_string())
        })?;

        let scanned_count = scanned.len();
        let rows = latest_per_subject(scanned);
        self.populate(&rows).await;

        info!(
            readings = scanned_count,
            subjects = rows.len(),
            "latest readings recomputed"
        );
        Ok(rows)
    }

    /// Invalidation hook for writers. Call after every successful persist of
    /// a subject or reading. Failures are logged, never returned.
    #[instrument(skip(self))]
    pub async fn on_subject_or_reading_written(&self) {
        match self.evict().await {
            Ok(()) => debug!("latest reading cache invalidated"),
            Err(e) => warn!(
                error = %e,
                ttl_secs = self.settings.ttl.as_secs(),
                "failed to invalidate latest reading cache; may be stale until expiry"
            ),
        }
    }

    async fn cached_rows(&self) -> Option<Vec<LatestReadingRow>> {
        let lookup = bounded(
            self.settings.cache_timeout,
            self.cache.get(LATEST_READING_CACHE_KEY),
            DomainError::CacheUnavailable,
        )
        .await;

        let payload = match lookup {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("latest reading cache miss");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "latest reading cache read failed; recomputing");
                return None;
            }
        };

        match serde_json::from_slice(&payload) {
            Ok(rows) => Some(rows),
            Err(e) => {
                warn!(error = %e, bytes = payload.len(), "discarding undecodable cached aggregate");
                if let Err(e) = self.evict().await {
                    debug!(error = %e, "failed to delete undecodable cached aggregate");
                }
                None
            }
        }
    }

    async fn populate(&self, rows: &[LatestReadingRow]) {
        let payload = match serde_json::to_vec(rows) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "failed to serialize latest readings; not caching");
                return;
            }
        };

        let stored = bounded(
            self.settings.cache_timeout,
            self.cache.set(LATEST_READING_CACHE_KEY, payload, self.settings.ttl),
            DomainError::CacheUnavailable,
        )
        .await;

        if let Err(e) = stored {
            warn!(error = %e, "failed to cache latest readings");
        }
    }

    async fn evict(&self) -> DomainResult<()> {
        bounded(
            self.settings.cache_timeout,
            self.cache.delete(LATEST_READING_CACHE_KEY),
            DomainError::CacheUnavailable,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::MokaCacheStore;
    use crate::domain::models::{NewReading, Reading, ReadingFilter, SubjectReading};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    fn row(reading_id: i64, subject_id: i64, name: &str, at: DateTime<Utc>, sys: i32, dia: i32) -> SubjectReading {
        SubjectReading {
            reading_id,
            subject_id,
            subject_name: name.to_string(),
            recorded_at: at,
            systolic: sys,
            diastolic: dia,
            heart_rate: None,
        }
    }

    /// Scan-only store that counts how often it is scanned.
    #[derive(Default)]
    struct CountingReadings {
        rows: Mutex<Vec<SubjectReading>>,
        scans: AtomicUsize,
        fail: bool,
        delay: Option<Duration>,
    }

    impl CountingReadings {
        fn with_rows(rows: Vec<SubjectReading>) -> Self {
            Self {
                rows: Mutex::new(rows),
                ..Default::default()
            }
        }

        fn push(&self, reading: SubjectReading) {
            self.rows.lock().unwrap().push(reading);
        }

        fn scans(&self) -> usize {
            self.scans.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReadingRepository for CountingReadings {
        async fn create(&self, _subject_id: i64, _reading: &NewReading) -> DomainResult<Reading> {
            unimplemented!("scan-only fake")
        }

        async fn list(&self, _filter: ReadingFilter) -> DomainResult<Vec<Reading>> {
            Ok(Vec::new())
        }

        async fn scan_joined(&self) -> DomainResult<Vec<SubjectReading>> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(DomainError::StoreUnavailable("connection refused".to_string()));
            }
            Ok(self.rows.lock().unwrap().clone())
        }
    }

    /// Cache whose every operation fails.
    struct BrokenCache;

    #[async_trait]
    impl CacheStore for BrokenCache {
        async fn get(&self, _key: &str) -> DomainResult<Option<Vec<u8>>> {
            Err(DomainError::CacheUnavailable("connection reset".to_string()))
        }

        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> DomainResult<()> {
            Err(DomainError::CacheUnavailable("connection reset".to_string()))
        }

        async fn delete(&self, _key: &str) -> DomainResult<()> {
            Err(DomainError::CacheUnavailable("connection reset".to_string()))
        }
    }

    /// Cache whose every operation never completes.
    struct HangingCache;

    #[async_trait]
    impl CacheStore for HangingCache {
        async fn get(&self, _key: &str) -> DomainResult<Option<Vec<u8>>> {
            std::future::pending().await
        }

        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> DomainResult<()> {
            std::future::pending().await
        }

        async fn delete(&self, _key: &str) -> DomainResult<()> {
            std::future::pending().await
        }
    }

    fn service(
        readings: Arc<CountingReadings>,
        cache: Arc<dyn CacheStore>,
    ) -> LatestReadingService<CountingReadings> {
        LatestReadingService::new(readings, cache)
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let readings = Arc::new(CountingReadings::with_rows(vec![
            row(1, 1, "Alice", t(1), 120, 80),
            row(2, 1, "Alice", t(2), 130, 85),
        ]));
        let svc = service(readings.clone(), Arc::new(MokaCacheStore::default()));

        let first = svc.latest_per_subject().await.unwrap();
        let second = svc.latest_per_subject().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].systolic, 130);
        assert_eq!(readings.scans(), 1);
    }

    #[tokio::test]
    async fn test_write_invalidation_forces_recompute() {
        let readings = Arc::new(CountingReadings::with_rows(vec![row(1, 1, "Alice", t(1), 120, 80)]));
        let svc = service(readings.clone(), Arc::new(MokaCacheStore::default()));

        svc.latest_per_subject().await.unwrap();
        readings.push(row(2, 1, "Alice", t(3), 140, 90));
        svc.on_subject_or_reading_written().await;

        let latest = svc.latest_per_subject().await.unwrap();
        assert_eq!((latest[0].systolic, latest[0].diastolic), (140, 90));
        assert_eq!(readings.scans(), 2);
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let readings = Arc::new(CountingReadings::with_rows(vec![row(1, 1, "Alice", t(1), 120, 80)]));
        let svc = service(readings.clone(), Arc::new(MokaCacheStore::default())).with_settings(
            AggregateSettings {
                ttl: Duration::from_millis(50),
                ..AggregateSettings::default()
            },
        );

        svc.latest_per_subject().await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        svc.latest_per_subject().await.unwrap();

        assert_eq!(readings.scans(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_is_retrieval_error_and_not_cached() {
        let readings = Arc::new(CountingReadings {
            fail: true,
            ..Default::default()
        });
        let cache = Arc::new(MokaCacheStore::default());
        let svc = service(readings, cache.clone());

        let err = svc.latest_per_subject().await.unwrap_err();
        assert!(matches!(err, DomainError::RetrievalError(_)));
        assert_eq!(cache.get(LATEST_READING_CACHE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_timeout_is_retrieval_error() {
        let readings = Arc::new(CountingReadings {
            delay: Some(Duration::from_millis(500)),
            ..Default::default()
        });
        let svc = service(readings, Arc::new(MokaCacheStore::default())).with_settings(
            AggregateSettings {
                store_timeout: Duration::from_millis(20),
                ..AggregateSettings::default()
            },
        );

        match svc.latest_per_subject().await {
            Err(DomainError::RetrievalError(msg)) => assert!(msg.contains("timed out")),
            other => panic!("expected retrieval error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_broken_cache_fails_open() {
        let readings = Arc::new(CountingReadings::with_rows(vec![row(1, 1, "Alice", t(1), 120, 80)]));
        let svc = service(readings.clone(), Arc::new(BrokenCache));

        let latest = svc.latest_per_subject().await.unwrap();
        svc.on_subject_or_reading_written().await;
        svc.latest_per_subject().await.unwrap();

        assert_eq!(latest.len(), 1);
        assert_eq!(readings.scans(), 2);
    }

    #[tokio::test]
    async fn test_hanging_cache_times_out_as_miss() {
        let readings = Arc::new(CountingReadings::with_rows(vec![row(1, 1, "Alice", t(1), 120, 80)]));
        let svc = service(readings.clone(), Arc::new(HangingCache)).with_settings(AggregateSettings {
            cache_timeout: Duration::from_millis(25),
            ..AggregateSettings::default()
        });

        let latest = tokio::time::timeout(Duration::from_secs(2), svc.latest_per_subject())
            .await
            .expect("read must not wait on a hung cache")
            .unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].systolic, 120);

        tokio::time::timeout(Duration::from_secs(2), svc.on_subject_or_reading_written())
            .await
            .expect("invalidation must not wait on a hung cache");

        tokio::time::timeout(Duration::from_secs(2), svc.latest_per_subject())
            .await
            .expect("second read must not wait on a hung cache")
            .unwrap();
        assert_eq!(readings.scans(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_recomputed_and_replaced() {
        let readings = Arc::new(CountingReadings::with_rows(vec![row(1, 1, "Alice", t(1), 120, 80)]));
        let cache = Arc::new(MokaCacheStore::default());
        cache
            .set(LATEST_READING_CACHE_KEY, b"{not json".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        let svc = service(readings.clone(), cache.clone());

        let latest = svc.latest_per_subject().await.unwrap();
        assert_eq!(latest[0].name, "Alice");
        assert_eq!(readings.scans(), 1);

        let repaired = cache.get(LATEST_READING_CACHE_KEY).await.unwrap().unwrap();
        let decoded: Vec<LatestReadingRow> = serde_json::from_slice(&repaired).unwrap();
        assert_eq!(decoded, latest);
    }

    #[tokio::test]
    async fn test_empty_aggregate_is_cached_as_present() {
        let readings = Arc::new(CountingReadings::default());
        let cache = Arc::new(MokaCacheStore::default());
        let svc = service(readings.clone(), cache.clone());

        assert!(svc.latest_per_subject().await.unwrap().is_empty());
        assert_eq!(
            cache.get(LATEST_READING_CACHE_KEY).await.unwrap().as_deref(),
            Some(b"[]".as_slice())
        );
        assert!(svc.latest_per_subject().await.unwrap().is_empty());
        assert_eq!(readings.scans(), 1);
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = Config::default();
        config.cache.ttl_secs = 42;
        config.cache.timeout_ms = 10;
        config.database.query_timeout_ms = 900;

        let settings = AggregateSettings::from_config(&config);
        assert_eq!(settings.ttl, Duration::from_secs(42));
        assert_eq!(settings.cache_timeout, Duration::from_millis(10));
        assert_eq!(settings.store_timeout, Duration::from_millis(900));
    }

    #[test]
    fn test_default_ttl_is_five_minutes() {
        assert_eq!(AggregateSettings::default().ttl, Duration::from_secs(300));
        assert_eq!(Config::default().cache.ttl_secs, DEFAULT_AGGREGATE_TTL_SECS);
    }
}
