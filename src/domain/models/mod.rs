//! Domain models.

pub mod config;
pub mod latest_reading;
pub mod reading;
pub mod subject;

pub use config::{
    CacheConfig, Config, DatabaseConfig, LogFormat, LoggingConfig, RotationPolicy, ServerConfig,
};
pub use latest_reading::{LatestReadingRow, SubjectReading};
pub use reading::{NewReading, Reading, ReadingFilter};
pub use subject::{NewSubject, Subject};
