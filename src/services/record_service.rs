//! Subject and reading writes.
//!
//! Every successful write invalidates the cached latest-reading aggregate
//! before returning to the caller.

use std::sync::Arc;
use tracing::{info, instrument};

use super::deadline::bounded;
use super::latest_reading_service::LatestReadingService;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{NewReading, NewSubject, Reading, ReadingFilter, Subject};
use crate::domain::ports::{ReadingRepository, SubjectRepository};

/// Validated writes and plain listings.
///
/// Writes invalidate `aggregate` after they persist.
pub struct RecordService<S: SubjectRepository, R: ReadingRepository> {
    subjects: Arc<S>,
    readings: Arc<R>,
    aggregate: Arc<LatestReadingService<R>>,
}

impl<S: SubjectRepository, R: ReadingRepository> RecordService<S, R> {
    /// Service writing through `subjects` and `readings`.
    pub fn new(subjects: Arc<S>, readings: Arc<R>, aggregate: Arc<LatestReadingService<R>>) -> Self {
        Self {
            subjects,
            readings,
            aggregate,
        }
    }

    /// Create a new subject.
    #[instrument(skip(self, subject), fields(name = %subject.name))]
    pub async fn create_subject(&self, subject: NewSubject) -> DomainResult<Subject> {
        subject.validate().map_err(DomainError::ValidationFailed)?;

        let created = self.store_call(self.subjects.create(&subject)).await?;
        self.aggregate.on_subject_or_reading_written().await;

        info!(subject_id = created.id, "subject created");
        Ok(created)
    }

    /// Append a reading for an existing subject.
    #[instrument(skip(self, reading))]
    pub async fn add_reading(&self, subject_id: i64, reading: NewReading) -> DomainResult<Reading> {
        reading.validate().map_err(DomainError::ValidationFailed)?;

        if self.store_call(self.subjects.get(subject_id)).await?.is_none() {
            return Err(DomainError::SubjectNotFound(subject_id));
        }

        let created = self.store_call(self.readings.create(subject_id, &reading)).await?;
        self.aggregate.on_subject_or_reading_written().await;

        info!(reading_id = created.id, subject_id, "reading recorded");
        Ok(created)
    }

    /// Get a subject by ID.
    pub async fn get_subject(&self, id: i64) -> DomainResult<Option<Subject>> {
        self.store_call(self.subjects.get(id)).await
    }

    /// List all subjects.
    pub async fn list_subjects(&self) -> DomainResult<Vec<Subject>> {
        self.store_call(self.subjects.list()).await
    }

    /// List readings in chronological order, optionally for one subject.
    pub async fn list_readings(&self, filter: ReadingFilter) -> DomainResult<Vec<Reading>> {
        self.store_call(self.readings.list(filter)).await
    }

    /// Count stored subjects.
    pub async fn count_subjects(&self) -> DomainResult<u64> {
        self.store_call(self.subjects.count()).await
    }

    async fn store_call<T>(
        &self,
        fut: impl std::future::Future<Output = DomainResult<T>>,
    ) -> DomainResult<T> {
        bounded(
            self.aggregate.settings().store_timeout,
            fut,
            DomainError::StoreUnavailable,
        )
        .await
    }
}
