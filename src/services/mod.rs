//! Application services: the cached aggregate, writes and demo seeding.

pub mod deadline;
pub mod latest_aggregator;
pub mod latest_reading_service;
pub mod record_service;
pub mod seed;

pub use latest_aggregator::latest_per_subject;
pub use latest_reading_service::{
    AggregateSettings, LatestReadingService, DEFAULT_AGGREGATE_TTL_SECS, LATEST_READING_CACHE_KEY,
};
pub use record_service::RecordService;
pub use seed::{seed_demo_data, SeedReport};
