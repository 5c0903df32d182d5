//! Infrastructure layer module
//!
//! Configuration loading, logging, project setup and the composition root
//! that wires adapters into services.

pub mod config;
pub mod context;
pub mod logging;
pub mod setup;

pub use context::AppContext;
