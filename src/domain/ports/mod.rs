//! Port trait definitions (Hexagonal Architecture)
//!
//! - SubjectRepository / ReadingRepository: the durable store
//! - CacheStore: the TTL-bounded cache holding the serialized aggregate
//!
//! Services depend only on these traits, so tests can swap in fakes.

pub mod cache_store;
pub mod null_cache;
pub mod reading_repository;
pub mod subject_repository;

pub use cache_store::CacheStore;
pub use null_cache::NullCacheStore;
pub use reading_repository::ReadingRepository;
pub use subject_repository::SubjectRepository;
