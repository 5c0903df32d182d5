//! HTTP API adapter.

pub mod vitals_http;

pub use vitals_http::{HttpConfig, VitalsHttpServer};
