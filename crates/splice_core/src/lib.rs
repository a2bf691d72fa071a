//! Splice Core - conversion plan compiler for ad insertion and overlays
//!
//! Turns a render request (main video, ads at timecodes, a timed banner, a
//! moving logo, track metadata edits) into an ordered list of ffmpeg steps.
//! Compilation is pure planning over probe results; running the plan is a
//! separate concern handled by [`orchestrator`].
//!
//! ```no_run
//! use splice_core::compiler::PlanCompiler;
//! use splice_core::config::Settings;
//! use splice_core::models::JobRequest;
//! use splice_core::orchestrator::{FfmpegExecutor, PlanRunner};
//! use splice_core::probe::FfprobeProbe;
//!
//! let settings = Settings::default();
//! let probe = FfprobeProbe::new(&settings.paths.ffprobe_path);
//! let job = JobRequest::new("episode.mkv", "episode_ads.mp4")
//!     .with_ad("12:30", "ads/spot.mp4")
//!     .with_logo("logo.png");
//!
//! let plan = PlanCompiler::new(&probe, &settings).compile(&job)?;
//! PlanRunner::new(FfmpegExecutor::new(&settings.paths.ffmpeg_path)).run(&plan)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod assemble;
pub mod compiler;
pub mod config;
pub mod filtergraph;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod plan;
pub mod planner;
pub mod probe;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
