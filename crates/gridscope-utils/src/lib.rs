//! # gridscope Utilities
//!
//! Shared logging setup for the gridscope workspace, built on `tracing`.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{LogFormat, LogLevel, LoggingConfig, LoggingError, LoggingGuard, init_logging, init_logging_with_level};
pub use tracing::{debug, error, info, trace, warn};
