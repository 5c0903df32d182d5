//! vitals - blood pressure readings with a cached "latest reading per subject" view
//!
//! Subjects and their readings live in SQLite. The most recent reading of
//! every subject is computed from a full scan, serialized, and kept in a
//! TTL-bounded cache; every write invalidates it.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, port traits and errors
//! - **Service Layer** (`services`): aggregation, cache-or-compute and writes
//! - **Adapters** (`adapters`): SQLite store, in-process cache, HTTP API
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging, wiring
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use vitals::infrastructure::AppContext;
//! use vitals::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ctx = AppContext::from_config(&Config::default()).await?;
//!     for row in ctx.aggregate.latest_per_subject().await? {
//!         println!("{}: {}/{}", row.name, row.systolic, row.diastolic);
//!     }
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    CacheConfig, Config, DatabaseConfig, LatestReadingRow, LoggingConfig, NewReading, NewSubject,
    Reading, ReadingFilter, ServerConfig, Subject, SubjectReading,
};
pub use domain::ports::{CacheStore, ReadingRepository, SubjectRepository};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{latest_per_subject, LatestReadingService, RecordService};
