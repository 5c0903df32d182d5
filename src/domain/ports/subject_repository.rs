//! Subject repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{NewSubject, Subject};

/// Repository interface for Subject persistence.
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// Persist a new subject and return it with its assigned id.
    async fn create(&self, subject: &NewSubject) -> DomainResult<Subject>;

    /// Get a subject by ID.
    async fn get(&self, id: i64) -> DomainResult<Option<Subject>>;

    /// List all subjects ordered by id.
    async fn list(&self) -> DomainResult<Vec<Subject>>;

    /// Count stored subjects.
    async fn count(&self) -> DomainResult<u64>;
}
