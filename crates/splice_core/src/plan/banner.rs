//! Banner track: one preprocessed clip, transparent fillers between windows,
//! stream-copied into a single track as long as the last window's end.

use std::path::PathBuf;

use crate::compiler::{PlanResult, PlanningError};
use crate::config::OverlaySettings;
use crate::filtergraph::{Filter, FilterChain};
use crate::logging::Diagnostics;
use crate::models::TargetParams;
use crate::planner::{BannerPlan, BannerWindow, TIME_EPSILON};

use super::concat::ConcatList;
use super::step::{format_secs, InputClause, InputOption, PipelineStep, StepId, StepKind, StepList};
use super::temp::TempAllocator;

/// Intermediate container for banner pieces; ffv1 with alpha needs Matroska.
pub const BANNER_EXT: &str = "mkv";

/// Banner height for a target width, keeping the banner's own aspect.
///
/// Falls back to a tenth of the target height when the banner has no usable
/// geometry.
pub fn banner_height(plan: &BannerPlan, target: &TargetParams) -> u32 {
    let scaled = plan
        .descriptor
        .as_ref()
        .and_then(|d| d.dimensions())
        .filter(|&(w, _)| w > 0)
        .map(|(w, h)| (f64::from(h) * f64::from(target.width) / f64::from(w)) as u32);
    scaled.unwrap_or(target.height / 10).max(1)
}

#[derive(Debug, Clone)]
pub struct BannerTrack {
    /// Final concatenated track, an input of the final render.
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub windows: Vec<BannerWindow>,
    pub list: ConcatList,
    pub list_path: PathBuf,
    pub clip_step: StepId,
    pub gap_steps: Vec<StepId>,
    pub concat_step: StepId,
}

fn require_target(target: &TargetParams, height: u32) -> PlanResult<()> {
    if !target.fps.is_positive() {
        return Err(PlanningError::missing_target_param("fps", "Banner gap filler"));
    }
    if target.width == 0 || height == 0 {
        return Err(PlanningError::missing_target_param("dimensions", "Banner clip"));
    }
    Ok(())
}

/// Emit the clip, gap and concat steps for a banner with at least one window.
pub fn build_banner_track(
    banner: &BannerPlan,
    target: &TargetParams,
    overlay: &OverlaySettings,
    steps: &mut StepList,
    temps: &mut TempAllocator,
    diag: &mut Diagnostics,
) -> PlanResult<BannerTrack> {
    if banner.windows.is_empty() {
        return Err(PlanningError::no_segments("banner track"));
    }
    let width = target.width;
    let height = banner_height(banner, target);
    require_target(target, height)?;

    let clip_path = temps.allocate("banner_clip", BANNER_EXT);
    let mut clip = PipelineStep::new("Banner clip", StepKind::BannerClip, clip_path.clone());
    let mut input = InputClause::file(&banner.source);
    if banner.is_still {
        input = input.with(InputOption::Loop);
    }
    clip.inputs.push(input);
    clip.video_filters = Some(
        FilterChain::new()
            .with(Filter::new("scale").arg(width).arg(height).opt("flags", "bicubic"))
            .with(Filter::new("setsar").opt("sar", target.sar_filter_value()))
            .with(Filter::new("fps").arg(target.fps))
            .with(Filter::new("format").opt("pix_fmts", &overlay.banner_pix_fmt)),
    );
    clip.maps.push("0:v:0".to_string());
    clip.codec_args = vec![
        "-an".to_string(),
        "-c:v".to_string(),
        overlay.banner_codec.clone(),
    ];
    clip.duration = Some(banner.duration);
    let clip_step = steps.push(clip);

    let mut list = ConcatList::new();
    let mut gap_steps = Vec::new();
    let mut last_end = 0.0;

    for window in &banner.windows {
        let gap = window.start - last_end;
        if gap > TIME_EPSILON {
            let gap_path = temps.allocate("banner_gap", BANNER_EXT);
            let mut step = PipelineStep::new(
                format!("Banner gap {}", gap_steps.len() + 1),
                StepKind::BannerGap,
                gap_path.clone(),
            );
            step.inputs.push(InputClause::lavfi(
                Filter::new("color")
                    .opt("c", &overlay.banner_gap_color)
                    .opt("s", format!("{}x{}", width, height))
                    .opt("d", format_secs(gap))
                    .opt("r", target.fps)
                    .to_string(),
            ));
            step.video_filters = Some(
                FilterChain::new().with(Filter::new("format").opt("pix_fmts", &overlay.banner_pix_fmt)),
            );
            step.codec_args = vec![
                "-c:v".to_string(),
                overlay.banner_codec.clone(),
                "-an".to_string(),
            ];
            step.duration = Some(gap);
            gap_steps.push(steps.push(step));
            list.push(gap_path);
        }
        list.push_with_duration(clip_path.clone(), window.duration());
        last_end = window.end;
    }

    let list_path = temps.allocate("concat_banner", "txt");
    let path = temps.allocate("banner_track", BANNER_EXT);
    let mut concat = PipelineStep::new("Banner track", StepKind::BannerConcat, path.clone());
    concat.inputs.push(InputClause::concat_list(&list_path));
    concat.codec_args = vec!["-c".to_string(), "copy".to_string()];
    concat.duration = Some(last_end);
    concat.depends_on.push(clip_step);
    concat.depends_on.extend(gap_steps.iter().copied());
    let concat_step = steps.push(concat);

    diag.debug(format!(
        "Banner track {}x{} with {} window(s), {} gap(s), length {}",
        width,
        height,
        banner.windows.len(),
        gap_steps.len(),
        format_secs(last_end)
    ));

    Ok(BannerTrack {
        path,
        width,
        height,
        windows: banner.windows.clone(),
        list,
        list_path,
        clip_step,
        gap_steps,
        concat_step,
    })
}
