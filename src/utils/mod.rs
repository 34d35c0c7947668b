//! Utility modules for error handling, configuration and logging

pub mod config;
pub mod error;
pub mod logging;
pub mod platform;

// Re-export for convenience
pub use config::{AppSettings, DEFAULT_FORMAT};
pub use error::VidfetchError;
pub use logging::init_tracing;
