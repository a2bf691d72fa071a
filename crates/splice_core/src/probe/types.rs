//! Probe contract and error types.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::StreamDescriptor;

/// Errors from running or parsing a probe.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    #[error("Failed to parse probe output: {0}")]
    Json(#[from] serde_json::Error),

    /// An earlier probe of the same file failed; it is not retried.
    #[error("Probe of {} failed earlier: {message}", path.display())]
    Failed { path: PathBuf, message: String },
}

pub type ProbeResult<T> = Result<T, ProbeError>;

/// Everything one probe call reveals about a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    /// `None` when the file exposes no streams at all.
    pub descriptor: Option<StreamDescriptor>,
    /// Seconds; `None` for stills and anything at or below 0.01 s.
    pub duration: Option<f64>,
    pub subtitle_count: usize,
}

/// Source of stream information for planning.
///
/// Implementors provide [`MediaProbe::inspect`]; the convenience methods
/// downgrade failures to `None` with a warning, which is how the planner
/// consumes probe results.
pub trait MediaProbe {
    fn inspect(&self, path: &Path) -> ProbeResult<ProbeReport>;

    fn probe(&self, path: &Path) -> Option<StreamDescriptor> {
        self.report(path).and_then(|r| r.descriptor)
    }

    fn duration(&self, path: &Path) -> Option<f64> {
        self.report(path).and_then(|r| r.duration)
    }

    fn subtitle_count(&self, path: &Path) -> usize {
        self.report(path).map(|r| r.subtitle_count).unwrap_or(0)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    /// `inspect` with the error logged and discarded.
    fn report(&self, path: &Path) -> Option<ProbeReport> {
        match self.inspect(path) {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!("Probe of {} failed: {}", path.display(), e);
                None
            }
        }
    }
}
