//! Error types for plan execution.
//!
//! Errors carry context that chains through layers:
//! Job → Step → Command → stderr tail

use std::io;

use thiserror::Error;

/// Top-level run error with job context.
#[derive(Error, Debug)]
pub enum RunError {
    /// A step failed during execution.
    #[error("Job '{job_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        job_name: String,
        step_name: String,
        #[source]
        source: ExecutionError,
    },

    /// Work directory or artifacts could not be written.
    #[error("Job '{job_name}' setup failed: {source}")]
    SetupFailed {
        job_name: String,
        #[source]
        source: ExecutionError,
    },

    #[error("Job '{job_name}' was cancelled")]
    Cancelled { job_name: String },
}

impl RunError {
    pub fn step_failed(
        job_name: impl Into<String>,
        step_name: impl Into<String>,
        source: ExecutionError,
    ) -> Self {
        Self::StepFailed {
            job_name: job_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    pub fn setup_failed(job_name: impl Into<String>, source: ExecutionError) -> Self {
        Self::SetupFailed {
            job_name: job_name.into(),
            source,
        }
    }

    pub fn cancelled(job_name: impl Into<String>) -> Self {
        Self::Cancelled {
            job_name: job_name.into(),
        }
    }
}

/// Failure of one external step.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The tool ran and exited non-zero.
    #[error("{step} failed with exit code {exit_code}: {stderr_tail}")]
    CommandFailed {
        step: String,
        exit_code: i32,
        stderr_tail: String,
    },

    #[error("Could not start {program} for {step}: {source}")]
    Spawn {
        step: String,
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    #[error("Cancelled before {step}")]
    Cancelled { step: String },
}

impl ExecutionError {
    pub fn command_failed(
        step: impl Into<String>,
        exit_code: i32,
        stderr_tail: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            step: step.into(),
            exit_code,
            stderr_tail: stderr_tail.into(),
        }
    }

    pub fn spawn(step: impl Into<String>, program: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            step: step.into(),
            program: program.into(),
            source,
        }
    }

    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    pub fn cancelled(step: impl Into<String>) -> Self {
        Self::Cancelled { step: step.into() }
    }
}

pub type ExecResult<T> = Result<T, ExecutionError>;

pub type RunResult<T> = Result<T, RunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failure_carries_tail() {
        let err = ExecutionError::command_failed("Ad segment 1", 1, "Invalid data found");
        let msg = err.to_string();
        assert!(msg.contains("Ad segment 1"));
        assert!(msg.contains("exit code 1"));
        assert!(msg.contains("Invalid data found"));
    }

    #[test]
    fn run_error_chains_context() {
        let err = RunError::step_failed(
            "episode_01",
            "Final render",
            ExecutionError::io("writing concat list", io::Error::other("disk full")),
        );
        let msg = err.to_string();
        assert!(msg.contains("episode_01"));
        assert!(msg.contains("Final render"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
