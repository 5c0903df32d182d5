//! SQLite database adapters for the vitals store.

pub mod connection;
pub mod migrations;
pub mod reading_repository;
pub mod subject_repository;

pub use connection::{create_pool, create_test_pool, verify_connection, ConnectionError, PoolConfig};
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use reading_repository::SqliteReadingRepository;
pub use subject_repository::SqliteSubjectRepository;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::DatabaseConfig;

/// Format a timestamp for storage.
///
/// Fixed-width microsecond precision in UTC, so lexical order of the stored
/// text matches chronological order.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse an RFC3339 datetime string from a SQLite row field.
pub fn parse_datetime(s: &str) -> DomainResult<DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| DomainError::SerializationError(e.to_string()))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a `YYYY-MM-DD` date string from a SQLite row field.
pub fn parse_date(s: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| DomainError::SerializationError(e.to_string()))
}

/// Failures bringing up the database.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Opening the pool failed.
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    /// A migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
    /// A query failed.
    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),
}

/// Open the database at `database_url` and apply all migrations.
pub async fn initialize_database(database_url: &str, config: Option<PoolConfig>) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(database_url, config).await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}

/// Open (creating if needed) and migrate the configured database.
pub async fn initialize_configured_database(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    initialize_database(&config.url(), Some(PoolConfig::from(config))).await
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}
