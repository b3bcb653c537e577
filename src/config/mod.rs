//! Versioned YAML configuration for the Prometheus metric sets and logging.

pub mod config;
pub mod logging;
pub mod metrics;

pub use config::*;
pub use logging::*;
pub use metrics::*;
