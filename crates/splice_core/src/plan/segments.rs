//! Concat-mode segment plan: uniform transcodes of ads and main sub-ranges.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::assemble::segment_codec_args;
use crate::compiler::{PlanResult, PlanningError};
use crate::config::EncodingSettings;
use crate::filtergraph::{Filter, FilterChain};
use crate::logging::Diagnostics;
use crate::models::TargetParams;
use crate::planner::{TimelinePlan, TIME_EPSILON};

use super::concat::ConcatList;
use super::step::{format_secs, InputClause, InputOption, PipelineStep, StepId, StepKind, StepList};
use super::temp::TempAllocator;

/// Container for every intermediate segment.
pub const SEGMENT_EXT: &str = "mp4";

/// Scale-to-fit, letterbox, then force SAR, frame rate and pixel format.
pub fn segment_video_chain(target: &TargetParams) -> FilterChain {
    let (w, h) = (target.width, target.height);
    FilterChain::new()
        .with(
            Filter::new("scale")
                .arg(w)
                .arg(h)
                .opt("force_original_aspect_ratio", "decrease")
                .opt("flags", "bicubic"),
        )
        .with(
            Filter::new("pad")
                .arg(w)
                .arg(h)
                .arg("(ow-iw)/2")
                .arg("(oh-ih)/2")
                .opt("color", "black"),
        )
        .with(Filter::new("setsar").opt("sar", target.sar_filter_value()))
        .with(Filter::new("fps").arg(target.fps))
        .with(Filter::new("format").opt("pix_fmts", &target.pix_fmt))
}

/// Resample and reformat to the target audio; `None` without target audio.
pub fn segment_audio_chain(target: &TargetParams) -> Option<FilterChain> {
    let audio = target.audio.as_ref()?;
    Some(
        FilterChain::new()
            .with(
                Filter::new("aresample")
                    .opt("resampler", "soxr")
                    .opt("osr", audio.sample_rate),
            )
            .with(
                Filter::new("aformat")
                    .opt("sample_fmts", &audio.sample_fmt)
                    .opt("channel_layouts", &audio.channel_layout),
            ),
    )
}

/// Source description for one transcode.
#[derive(Debug, Clone, Copy)]
pub struct SegmentSource<'a> {
    pub path: &'a Path,
    pub start: f64,
    pub duration: f64,
    pub is_still: bool,
    pub has_audio: bool,
}

/// Build one uniform transcode step.
pub fn segment_step(
    name: String,
    kind: StepKind,
    source: SegmentSource<'_>,
    output: PathBuf,
    target: &TargetParams,
    encoding: &EncodingSettings,
) -> PipelineStep {
    let mut step = PipelineStep::new(name, kind, output);

    let mut input = InputClause::file(source.path);
    if source.is_still {
        input = input.with(InputOption::Loop);
    }
    if source.start > TIME_EPSILON {
        input = input.with(InputOption::Seek(source.start));
    }
    step.inputs.push(input);
    step.duration = Some(source.duration);
    step.video_filters = Some(segment_video_chain(target));
    step.maps.push("0:v:0?".to_string());

    match (&target.audio, segment_audio_chain(target)) {
        (Some(audio), Some(chain)) => {
            step.audio_filters = Some(chain);
            if source.has_audio {
                step.maps.push("0:a:0?".to_string());
            } else {
                step.inputs.push(InputClause::lavfi(format!(
                    "anullsrc=r={}:cl={}",
                    audio.sample_rate, audio.channel_layout
                )));
                step.maps.push("1:a:0".to_string());
            }
            step.codec_args = segment_codec_args(encoding, true);
        }
        _ => {
            step.codec_args.push("-an".to_string());
            step.codec_args.extend(segment_codec_args(encoding, false));
        }
    }

    step.output_args = vec![
        "-avoid_negative_ts".to_string(),
        "make_zero".to_string(),
        "-video_track_timescale".to_string(),
        target.video_timescale.to_string(),
    ];
    step
}

/// Steps and list produced for concat mode.
#[derive(Debug, Clone)]
pub struct SegmentPlan {
    pub list: ConcatList,
    pub list_path: PathBuf,
    pub ad_steps: Vec<StepId>,
    pub main_steps: Vec<StepId>,
}

impl SegmentPlan {
    pub fn all_steps(&self) -> Vec<StepId> {
        let mut ids: Vec<StepId> = self.ad_steps.iter().chain(&self.main_steps).copied().collect();
        ids.sort();
        ids
    }
}

/// Emit ad transcodes (one per unique source path), main sub-range
/// transcodes, and the interleaved concat list.
pub fn build_segment_plan(
    main: &Path,
    timeline: &TimelinePlan,
    target: &TargetParams,
    encoding: &EncodingSettings,
    steps: &mut StepList,
    temps: &mut TempAllocator,
    diag: &mut Diagnostics,
) -> PlanResult<SegmentPlan> {
    let mut encoded: HashMap<&Path, PathBuf> = HashMap::new();
    let mut ad_steps = Vec::new();

    for ad in &timeline.ads {
        if encoded.contains_key(ad.source.as_path()) {
            continue;
        }
        let output = temps.allocate("ad", SEGMENT_EXT);
        let display = ad
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| ad.source.display().to_string());
        let id = steps.push(segment_step(
            format!("Ad segment {} ({})", ad_steps.len() + 1, display),
            StepKind::AdSegment,
            SegmentSource {
                path: &ad.source,
                start: 0.0,
                duration: ad.duration,
                is_still: ad.is_still,
                has_audio: ad.descriptor.has_audio,
            },
            output.clone(),
            target,
            encoding,
        ));
        ad_steps.push(id);
        encoded.insert(ad.source.as_path(), output);
    }
    if ad_steps.len() < timeline.ads.len() {
        diag.info(format!(
            "{} ad insertions reuse {} transcoded file(s)",
            timeline.ads.len(),
            ad_steps.len()
        ));
    }

    let mut list = ConcatList::new();
    let mut main_steps = Vec::new();
    let mut last = 0.0;

    let mut push_main = |from: f64, to: f64, list: &mut ConcatList, steps: &mut StepList, temps: &mut TempAllocator| {
        let length = to - from;
        if length <= TIME_EPSILON {
            return;
        }
        let output = temps.allocate("main", SEGMENT_EXT);
        let id = steps.push(segment_step(
            format!("Main segment {}-{}", format_secs(from), format_secs(to)),
            StepKind::MainSegment,
            SegmentSource {
                path: main,
                start: from,
                duration: length,
                is_still: false,
                has_audio: target.has_audio(),
            },
            output.clone(),
            target,
            encoding,
        ));
        main_steps.push(id);
        list.push(output);
    };

    for ad in &timeline.ads {
        push_main(last, ad.time, &mut list, steps, temps);
        if let Some(path) = encoded.get(ad.source.as_path()) {
            list.push(path.clone());
        }
        last = ad.time;
    }
    push_main(last, timeline.main_duration, &mut list, steps, temps);

    if list.is_empty() {
        return Err(PlanningError::no_segments("main video concatenation"));
    }

    let list_path = temps.allocate("concat_main", "txt");
    diag.debug(format!(
        "Concat list {} with {} entries",
        list_path.display(),
        list.len()
    ));

    Ok(SegmentPlan {
        list,
        list_path,
        ad_steps,
        main_steps,
    })
}
