//! Job request to conversion plan.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::assemble::{assemble_final, BannerInput, FinalRenderRequest, LogoInput, StreamIndexMap};
use crate::config::Settings;
use crate::logging::{sanitize_filename, Diagnostics};
use crate::models::{JobRequest, TargetParams};
use crate::plan::{
    build_banner_track, build_segment_plan, Artifact, PipelineStep, StepId, StepKind, StepList,
    TempAllocator,
};
use crate::planner::{negotiate, TimelinePlan, TimelinePlanner};
use crate::probe::MediaProbe;

use super::errors::{PlanResult, PlanningError};

/// Everything needed to execute one job.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionPlan {
    pub job_name: String,
    pub target: TargetParams,
    pub timeline: TimelinePlan,
    /// Ordered; the last step is always the final render.
    pub steps: Vec<PipelineStep>,
    /// Files written before the first step runs.
    pub artifacts: Vec<Artifact>,
    /// Every intermediate path, removed after the run.
    pub temp_files: Vec<PathBuf>,
    pub work_dir: PathBuf,
    pub streams: StreamIndexMap,
    pub diagnostics: Diagnostics,
}

impl ConversionPlan {
    pub fn final_step(&self) -> Option<&PipelineStep> {
        self.steps.last().filter(|s| s.kind == StepKind::FinalRender)
    }

    pub fn steps_of(&self, kind: StepKind) -> impl Iterator<Item = &PipelineStep> {
        self.steps.iter().filter(move |s| s.kind == kind)
    }

    pub fn is_concat_mode(&self) -> bool {
        self.timeline.is_concat_mode()
    }
}

/// Compiles [`JobRequest`]s against a probe and settings.
pub struct PlanCompiler<'a> {
    probe: &'a dyn MediaProbe,
    settings: &'a Settings,
    work_root: PathBuf,
}

impl<'a> PlanCompiler<'a> {
    pub fn new(probe: &'a dyn MediaProbe, settings: &'a Settings) -> Self {
        Self {
            probe,
            settings,
            work_root: PathBuf::from(&settings.paths.temp_root),
        }
    }

    /// Root under which each job gets its own work directory.
    pub fn with_work_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.work_root = root.into();
        self
    }

    pub fn work_dir_for(&self, job: &JobRequest) -> PathBuf {
        self.work_root.join(sanitize_filename(&job.name()))
    }

    pub fn compile(&self, job: &JobRequest) -> PlanResult<ConversionPlan> {
        let mut diag = Diagnostics::new();
        let probe = self.probe;

        if !probe.exists(&job.input) {
            return Err(PlanningError::InputNotFound(job.input.clone()));
        }
        let main = probe.report(&job.input).unwrap_or_default();
        let descriptor = main.descriptor.unwrap_or_default();
        let target = negotiate(&descriptor, &mut diag)?;
        let main_duration = main
            .duration
            .ok_or_else(|| PlanningError::MainDurationUnknown(job.input.clone()))?;

        let timeline = TimelinePlanner::new(probe, &self.settings.policy)
            .plan(job, main_duration, &mut diag);

        let work_dir = self.work_dir_for(job);
        let mut temps = TempAllocator::new(&work_dir);
        let mut steps = StepList::new();
        let mut artifacts = Vec::new();

        let concat_list = if timeline.is_concat_mode() {
            let segments = build_segment_plan(
                &job.input,
                &timeline,
                &target,
                &self.settings.encoding,
                &mut steps,
                &mut temps,
                &mut diag,
            )?;
            artifacts.push(segments.list.to_artifact(&segments.list_path));
            Some(segments.list_path)
        } else {
            None
        };

        let banner_track = match &timeline.banner {
            Some(banner) => {
                let track = build_banner_track(
                    banner,
                    &target,
                    &self.settings.overlay,
                    &mut steps,
                    &mut temps,
                    &mut diag,
                )?;
                artifacts.push(track.list.to_artifact(&track.list_path));
                Some(track)
            }
            None => None,
        };

        let logo = job
            .logo
            .as_ref()
            .and_then(|logo| self.resolve_logo(&logo.path, &mut diag));

        let depends_on: Vec<StepId> = (0..steps.len()).map(StepId).collect();
        let request = FinalRenderRequest {
            main: &job.input,
            output: &job.output,
            target: &target,
            final_duration: timeline.final_duration,
            concat_list: concat_list.as_deref(),
            banner: banner_track.as_ref().map(|track| BannerInput {
                path: &track.path,
                windows: &track.windows,
            }),
            logo: logo.as_ref().map(|(path, is_still)| LogoInput {
                path,
                is_still: *is_still,
            }),
            subtitle_count: main.subtitle_count,
            track_edits: &job.track_edits,
            settings: self.settings,
            depends_on: &depends_on,
        };
        let render = assemble_final(&request, &mut diag)?;
        steps.push(render.step);

        diag.info(format!(
            "Planned {} step(s) for '{}', output {:.3}s",
            steps.len(),
            job.name(),
            timeline.final_duration
        ));

        Ok(ConversionPlan {
            job_name: job.name(),
            target,
            timeline,
            steps: steps.into_vec(),
            artifacts,
            temp_files: temps.into_paths(),
            work_dir,
            streams: render.streams,
            diagnostics: diag,
        })
    }

    /// Logo path and whether it is a still, or `None` when unusable.
    fn resolve_logo(&self, path: &Path, diag: &mut Diagnostics) -> Option<(PathBuf, bool)> {
        if !self.probe.exists(path) {
            diag.warn(format!("Logo '{}' not found, logo skipped", path.display()));
            return None;
        }
        let report = self.probe.report(path).unwrap_or_default();
        if report.descriptor.is_none() {
            diag.warn(format!(
                "Logo '{}' has no usable video stream, logo skipped",
                path.display()
            ));
            return None;
        }
        let is_still = report.duration.is_none();
        Some((path.to_path_buf(), is_still))
    }
}
