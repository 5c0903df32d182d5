//! Composition root: builds the store, cache and services from `Config`.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

use crate::adapters::cache::MokaCacheStore;
use crate::adapters::sqlite::{initialize_configured_database, SqliteReadingRepository, SqliteSubjectRepository};
use crate::domain::models::{CacheConfig, Config};
use crate::domain::ports::{CacheStore, NullCacheStore};
use crate::services::{AggregateSettings, LatestReadingService, RecordService};

/// Cached latest-reading aggregate over SQLite.
pub type Aggregate = LatestReadingService<SqliteReadingRepository>;
/// Subject and reading writes over SQLite.
pub type Records = RecordService<SqliteSubjectRepository, SqliteReadingRepository>;

/// Fully wired services sharing one pool and one cache.
#[derive(Clone)]
pub struct AppContext {
    /// Shared connection pool
    pub pool: SqlitePool,
    /// Latest-reading read path
    pub aggregate: Arc<Aggregate>,
    /// Write path and listings
    pub records: Arc<Records>,
}

impl AppContext {
    /// Open the configured database, run migrations and wire services.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let pool = initialize_configured_database(&config.database)
            .await
            .with_context(|| {
                format!(
                    "Failed to open database at {}. Run 'vitals init' first.",
                    config.database.path
                )
            })?;
        Ok(Self::with_pool(pool, config))
    }

    /// Wire services over an existing, migrated pool.
    pub fn with_pool(pool: SqlitePool, config: &Config) -> Self {
        let readings = Arc::new(SqliteReadingRepository::new(pool.clone()));
        let subjects = Arc::new(SqliteSubjectRepository::new(pool.clone()));

        let aggregate = Arc::new(
            LatestReadingService::new(readings.clone(), cache_store(&config.cache))
                .with_settings(AggregateSettings::from_config(config)),
        );
        let records = Arc::new(RecordService::new(subjects, readings, aggregate.clone()));

        Self {
            pool,
            aggregate,
            records,
        }
    }
}

fn cache_store(config: &CacheConfig) -> Arc<dyn CacheStore> {
    if config.enabled {
        Arc::new(MokaCacheStore::new(config.max_capacity))
    } else {
        info!("aggregate cache disabled; every read recomputes");
        Arc::new(NullCacheStore)
    }
}
