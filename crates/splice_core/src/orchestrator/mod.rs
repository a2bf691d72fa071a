//! Plan execution.
//!
//! The compiler produces data; this module turns it into processes. Steps run
//! strictly in order; `depends_on` only records which ones are independent.

mod errors;
mod executor;
mod runner;

pub use errors::{ExecResult, ExecutionError, RunError, RunResult};
pub use executor::{FfmpegExecutor, StepExecutor};
pub use runner::{CancelHandle, PlanRunner, RunSummary};
