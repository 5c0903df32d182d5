//! SQLite database migration management.

use sqlx::SqlitePool;
use thiserror::Error;

/// Migration failures.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A migration script failed.
    #[error("Failed to execute migration {version}: {source}")]
    ExecutionError {
        /// Version of the failing migration
        version: i64,
        /// Underlying database error
        #[source]
        source: sqlx::Error,
    },
    /// The applied version could not be read.
    #[error("Failed to get schema version: {0}")]
    VersionCheckError(#[source] sqlx::Error),
}

/// One schema migration.
#[derive(Debug, Clone)]
pub struct Migration {
    /// Monotonic schema version
    pub version: i64,
    /// Short description
    pub description: String,
    /// Statements to execute
    pub sql: String,
}

/// Applies embedded migrations in version order.
pub struct Migrator {
    pool: SqlitePool,
}

impl Migrator {
    /// Wrap an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply every migration newer than the recorded schema version.
    pub async fn run_embedded_migrations(&self, migrations: Vec<Migration>) -> Result<usize, MigrationError> {
        self.ensure_migrations_table().await?;
        let current_version = self.get_current_version().await?;
        let pending: Vec<_> = migrations.into_iter().filter(|m| m.version > current_version).collect();

        for migration in &pending {
            self.apply_migration(migration).await?;
        }

        Ok(pending.len())
    }

    async fn ensure_migrations_table(&self) -> Result<(), MigrationError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now')),
                description TEXT
            )"
        )
        .execute(&self.pool)
        .await
        .map_err(|e| MigrationError::ExecutionError { version: 0, source: e })?;
        Ok(())
    }

    /// Highest applied version, 0 on a fresh database.
    pub async fn get_current_version(&self) -> Result<i64, MigrationError> {
        let result: Option<(i64,)> = sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
            .fetch_optional(&self.pool)
            .await
            .map_err(MigrationError::VersionCheckError)?;
        Ok(result.map_or(0, |(v,)| v))
    }

    async fn apply_migration(&self, migration: &Migration) -> Result<(), MigrationError> {
        sqlx::raw_sql(&migration.sql)
            .execute(&self.pool)
            .await
            .map_err(|e| MigrationError::ExecutionError { version: migration.version, source: e })?;

        sqlx::query("INSERT INTO schema_migrations (version, description) VALUES (?, ?)")
            .bind(migration.version)
            .bind(&migration.description)
            .execute(&self.pool)
            .await
            .map_err(|e| MigrationError::ExecutionError { version: migration.version, source: e })?;

        tracing::debug!(version = migration.version, description = %migration.description, "applied migration");
        Ok(())
    }
}

/// Migration creating the subjects and readings tables.
pub fn initial_schema_migration() -> Migration {
    Migration {
        version: 1,
        description: "Subjects and readings".to_string(),
        sql: include_str!("../../../migrations/001_initial_schema.sql").to_string(),
    }
}

/// Every embedded migration, oldest first.
pub fn all_embedded_migrations() -> Vec<Migration> {
    vec![initial_schema_migration()]
}
