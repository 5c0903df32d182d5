//! Common test utilities for integration tests
//!
//! Provides a SQLite-backed harness whose reading repository counts full
//! scans, so tests can observe whether the cache short-circuited a read.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use vitals::adapters::cache::MokaCacheStore;
use vitals::adapters::sqlite::{create_migrated_test_pool, SqliteReadingRepository, SqliteSubjectRepository};
use vitals::domain::models::{NewReading, NewSubject, Reading, ReadingFilter, Subject, SubjectReading};
use vitals::domain::ports::ReadingRepository;
use vitals::services::AggregateSettings;
use vitals::{DomainResult, LatestReadingService, RecordService};

/// Reading repository that forwards to SQLite and counts full scans.
pub struct CountingReadings {
    inner: SqliteReadingRepository,
    scans: AtomicUsize,
}

impl CountingReadings {
    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReadingRepository for CountingReadings {
    async fn create(&self, subject_id: i64, reading: &NewReading) -> DomainResult<Reading> {
        self.inner.create(subject_id, reading).await
    }

    async fn list(&self, filter: ReadingFilter) -> DomainResult<Vec<Reading>> {
        self.inner.list(filter).await
    }

    async fn scan_joined(&self) -> DomainResult<Vec<SubjectReading>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner.scan_joined().await
    }
}

pub struct Harness {
    pub records: RecordService<SqliteSubjectRepository, CountingReadings>,
    pub aggregate: Arc<LatestReadingService<CountingReadings>>,
    pub readings: Arc<CountingReadings>,
    pub cache: Arc<MokaCacheStore>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_ttl(Duration::from_secs(300)).await
    }

    pub async fn with_ttl(ttl: Duration) -> Self {
        let pool = create_migrated_test_pool().await.expect("test pool");
        let readings = Arc::new(CountingReadings {
            inner: SqliteReadingRepository::new(pool.clone()),
            scans: AtomicUsize::new(0),
        });
        let cache = Arc::new(MokaCacheStore::default());
        let settings = AggregateSettings {
            ttl,
            ..AggregateSettings::default()
        };
        let aggregate =
            Arc::new(LatestReadingService::new(readings.clone(), cache.clone()).with_settings(settings));
        let records = RecordService::new(
            Arc::new(SqliteSubjectRepository::new(pool)),
            readings.clone(),
            aggregate.clone(),
        );

        Self {
            records,
            aggregate,
            readings,
            cache,
        }
    }

    pub async fn subject(&self, name: &str) -> Subject {
        let dob = NaiveDate::from_ymd_opt(1980, 5, 12).expect("valid date");
        self.records
            .create_subject(NewSubject::new(name, dob))
            .await
            .expect("create subject")
    }

    pub async fn reading(&self, subject: &Subject, systolic: i32, diastolic: i32, at: DateTime<Utc>) -> Reading {
        self.records
            .add_reading(subject.id, NewReading::new(systolic, diastolic).recorded_at(at))
            .await
            .expect("add reading")
    }
}

/// A fixed instant `hours` after a base time.
pub fn t(hours: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::hours(hours)
}
