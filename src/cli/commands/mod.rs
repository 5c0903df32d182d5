//! CLI command implementations.

pub mod init;
pub mod reading;
pub mod seed;
pub mod serve;
pub mod stats;
pub mod subject;
