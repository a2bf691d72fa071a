//! Fatal planning errors.
//!
//! Per-item problems (a missing ad, a bad timecode) never surface here; they
//! become warnings in the plan's diagnostics. These variants stop the job.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanningError {
    /// The main video lacks geometry every later stage depends on.
    #[error("Main video is missing required stream parameters: {}", missing.join(", "))]
    MissingVideoParams { missing: Vec<&'static str> },

    #[error("Main input not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Could not determine the duration of the main video {0}")]
    MainDurationUnknown(PathBuf),

    /// A concatenation was required but nothing would go into it.
    #[error("No usable segments for {what}")]
    NoSegments { what: String },

    #[error("{purpose} needs target {param}, which is unavailable")]
    MissingTargetParam {
        param: &'static str,
        purpose: String,
    },

    /// User supplied parameter string could not be tokenized.
    #[error("Invalid syntax in {what}: {message}")]
    InvalidParameters { what: String, message: String },
}

impl PlanningError {
    pub fn no_segments(what: impl Into<String>) -> Self {
        Self::NoSegments { what: what.into() }
    }

    pub fn missing_target_param(param: &'static str, purpose: impl Into<String>) -> Self {
        Self::MissingTargetParam {
            param,
            purpose: purpose.into(),
        }
    }

    pub fn invalid_parameters(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            what: what.into(),
            message: message.into(),
        }
    }
}

pub type PlanResult<T> = Result<T, PlanningError>;
