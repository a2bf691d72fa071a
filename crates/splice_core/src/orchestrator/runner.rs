//! Sequential plan runner.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::compiler::ConversionPlan;
use crate::logging::JobLogger;

use super::errors::{ExecutionError, RunError, RunResult};
use super::executor::StepExecutor;

/// Runs a plan's steps in order.
///
/// Artifacts are written first. Cancellation is checked at every step
/// boundary. Every temp path registered in the plan is removed on failure
/// or cancellation, and after success unless temp files are kept.
pub struct PlanRunner<E: StepExecutor> {
    executor: E,
    keep_temp_files: bool,
    cancelled: Arc<AtomicBool>,
    logger: Option<Arc<JobLogger>>,
}

impl<E: StepExecutor> PlanRunner<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            keep_temp_files: false,
            cancelled: Arc::new(AtomicBool::new(false)),
            logger: None,
        }
    }

    pub fn keep_temp_files(mut self, keep: bool) -> Self {
        self.keep_temp_files = keep;
        self
    }

    pub fn with_logger(mut self, logger: Arc<JobLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Call `cancel()` on the handle to stop at the next step boundary.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            flag: Arc::clone(&self.cancelled),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn run(&self, plan: &ConversionPlan) -> RunResult<RunSummary> {
        let outcome = self.run_steps(plan);

        let keep = self.keep_temp_files && outcome.is_ok();
        let removed = if keep {
            self.info(&format!(
                "Keeping {} temp file(s) in {}",
                plan.temp_files.len(),
                plan.work_dir.display()
            ));
            0
        } else {
            self.cleanup(plan)
        };

        let steps_completed = outcome?;
        let output = plan
            .final_step()
            .map(|s| s.output.clone())
            .unwrap_or_default();
        self.success(&format!("Wrote {}", output.display()));
        Ok(RunSummary {
            steps_completed,
            output,
            temp_files_removed: removed,
        })
    }

    fn run_steps(&self, plan: &ConversionPlan) -> RunResult<Vec<String>> {
        let job = plan.job_name.as_str();
        if let Some(logger) = &self.logger {
            logger.diagnostics(&plan.diagnostics);
        }

        if !plan.temp_files.is_empty() {
            fs::create_dir_all(&plan.work_dir).map_err(|e| {
                RunError::setup_failed(job, ExecutionError::io("creating work directory", e))
            })?;
        }
        for artifact in &plan.artifacts {
            fs::write(&artifact.path, &artifact.contents).map_err(|e| {
                RunError::setup_failed(
                    job,
                    ExecutionError::io(format!("writing {}", artifact.path.display()), e),
                )
            })?;
            self.debug(&format!("Wrote {}", artifact.path.display()));
        }

        let mut completed = Vec::with_capacity(plan.steps.len());
        for step in &plan.steps {
            if self.is_cancelled() {
                self.warn(&format!("Cancelled before step '{}'", step.name));
                return Err(RunError::cancelled(job));
            }
            self.phase(&step.name);
            self.executor.run(step, &step.name).map_err(|e| {
                self.error(&format!("{} failed: {}", step.name, e));
                RunError::step_failed(job, &step.name, e)
            })?;
            completed.push(step.name.clone());
        }
        Ok(completed)
    }

    /// Remove every registered temp path and the work directory if empty.
    fn cleanup(&self, plan: &ConversionPlan) -> usize {
        let mut removed = 0;
        for path in &plan.temp_files {
            match remove_if_present(path) {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => self.warn(&format!("Could not remove {}: {}", path.display(), e)),
            }
        }
        if !plan.temp_files.is_empty() {
            // Fails when other files remain, which is fine.
            let _ = fs::remove_dir(&plan.work_dir);
        }
        if removed > 0 {
            self.debug(&format!("Removed {} temp file(s)", removed));
        }
        removed
    }

    fn phase(&self, name: &str) {
        match &self.logger {
            Some(logger) => logger.phase(name),
            None => tracing::info!("=== {} ===", name),
        }
    }

    fn info(&self, message: &str) {
        match &self.logger {
            Some(logger) => logger.info(message),
            None => tracing::info!("{}", message),
        }
    }

    fn debug(&self, message: &str) {
        match &self.logger {
            Some(logger) => logger.debug(message),
            None => tracing::debug!("{}", message),
        }
    }

    fn success(&self, message: &str) {
        match &self.logger {
            Some(logger) => logger.success(message),
            None => tracing::info!("{}", message),
        }
    }

    fn warn(&self, message: &str) {
        match &self.logger {
            Some(logger) => logger.warn(message),
            None => tracing::warn!("{}", message),
        }
    }

    fn error(&self, message: &str) {
        match &self.logger {
            Some(logger) => logger.error(message),
            None => tracing::error!("{}", message),
        }
    }
}

fn remove_if_present(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Handle for cancelling a running plan.
#[derive(Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// The runner stops at the next step boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub steps_completed: Vec<String>,
    pub output: PathBuf,
    pub temp_files_removed: usize,
}
