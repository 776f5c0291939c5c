//! Core utilities and types shared across all Hostwatch crates

pub mod config;
pub mod problem;

// Re-export commonly used types
pub use config::MonitorSettings;
pub use problem::{bad_request, internal_server_error, Problem};

// Re-export external dependencies
pub use chrono;
pub use serde;
pub use serde_json;
