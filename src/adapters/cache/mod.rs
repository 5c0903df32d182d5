//! In-memory cache adapters.
//!
//! Uses `moka` for concurrent TTL caching. Entries carry their own
//! time-to-live so the aggregate service decides expiry per `set`.

pub mod moka_cache_store;

pub use moka_cache_store::MokaCacheStore;
