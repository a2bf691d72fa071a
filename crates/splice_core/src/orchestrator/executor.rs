//! Running a pipeline step as an external process.

use std::process::{Command, Stdio};
use std::sync::Arc;

use crate::logging::JobLogger;
use crate::plan::PipelineStep;

use super::errors::{ExecResult, ExecutionError};

const DEFAULT_TAIL_LINES: usize = 20;

/// Runs one step to completion.
pub trait StepExecutor {
    fn run(&self, step: &PipelineStep, name: &str) -> ExecResult<()>;
}

/// Executes steps with the ffmpeg binary.
pub struct FfmpegExecutor {
    program: String,
    tail_lines: usize,
    logger: Option<Arc<JobLogger>>,
}

impl FfmpegExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            program: if program.is_empty() {
                "ffmpeg".to_string()
            } else {
                program
            },
            tail_lines: DEFAULT_TAIL_LINES,
            logger: None,
        }
    }

    /// Lines of stderr attached to a failure.
    pub fn with_tail_lines(mut self, lines: usize) -> Self {
        self.tail_lines = lines;
        self
    }

    pub fn with_logger(mut self, logger: Arc<JobLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn tail(&self, stderr: &str) -> String {
        let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
        let start = lines.len().saturating_sub(self.tail_lines);
        lines[start..].join("\n")
    }
}

impl Default for FfmpegExecutor {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl StepExecutor for FfmpegExecutor {
    fn run(&self, step: &PipelineStep, name: &str) -> ExecResult<()> {
        let command_line = step.command_line(&self.program);
        match &self.logger {
            Some(logger) => logger.command(&command_line),
            None => tracing::info!("$ {}", command_line),
        }

        let result = Command::new(&self.program)
            .arg("-hide_banner")
            .args(step.to_args())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ExecutionError::spawn(name, &self.program, e))?;

        let stderr = String::from_utf8_lossy(&result.stderr);
        if let Some(logger) = &self.logger {
            logger.clear_tail();
            for line in stderr.lines() {
                logger.output_line(line);
            }
        }

        if !result.status.success() {
            let exit_code = result.status.code().unwrap_or(-1);
            if let Some(logger) = &self.logger {
                logger.show_tail(name);
            }
            tracing::error!("{} exited with code {}", name, exit_code);
            return Err(ExecutionError::command_failed(name, exit_code, self.tail(&stderr)));
        }

        tracing::debug!("{} completed", name);
        Ok(())
    }
}
