//! Logging infrastructure.
//!
//! This module provides:
//! - Plan diagnostics: an ordered `{level, message}` list returned with each plan
//! - Per-job loggers writing to a file and an optional callback
//! - A tail buffer of external tool output for failure reports
//! - Global `tracing` subscriber setup
//!
//! # Example
//!
//! ```no_run
//! use splice_core::logging::{JobLogger, LogConfig};
//!
//! let logger = JobLogger::new("my_render", "/tmp/logs", LogConfig::default(), None).unwrap();
//! logger.phase("Segments");
//! logger.command("ffmpeg -y -i input.mkv ...");
//! logger.success("Render finished");
//! ```

mod diagnostics;
mod job_logger;
mod types;

pub use diagnostics::{Diagnostic, Diagnostics};
pub use job_logger::JobLogger;
pub(crate) use job_logger::sanitize_filename;
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_level` when set. Output goes to stderr.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
}

/// Initialize tracing for tests (warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_test_tracing();
        init_test_tracing();
        assert_eq!(LogLevel::Debug.as_filter_str(), "debug");
    }
}
