//! Reading repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{NewReading, Reading, ReadingFilter, SubjectReading};

/// Repository interface for append-only Reading persistence.
#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// Append a reading for a subject and return it with its assigned id.
    ///
    /// An absent `recorded_at` is stamped with the time of insertion.
    async fn create(&self, subject_id: i64, reading: &NewReading) -> DomainResult<Reading>;

    /// List readings ordered by time ascending, then insertion order.
    async fn list(&self, filter: ReadingFilter) -> DomainResult<Vec<Reading>>;

    /// Full scan of every reading joined with its subject, ordered by
    /// `recorded_at` descending and then by reading id descending.
    async fn scan_joined(&self) -> DomainResult<Vec<SubjectReading>>;
}
