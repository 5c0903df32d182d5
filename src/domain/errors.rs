//! Domain errors for the vitals tracker.

use thiserror::Error;

/// Domain-level errors that can occur in the vitals system.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No subject with this id.
    #[error("Subject not found: {0}")]
    SubjectNotFound(i64),

    /// Input rejected before it reached the store.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// The store could not complete a scan or write (connection, transport, timeout).
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The cache could not complete a get, set or delete.
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    /// A payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The aggregate could not be produced. Never accompanied by partial data.
    #[error("Failed to retrieve latest readings: {0}")]
    RetrievalError(String),
}

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::StoreUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
