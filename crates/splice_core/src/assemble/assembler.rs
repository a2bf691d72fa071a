//! The final render step.

use std::collections::BTreeMap;
use std::path::Path;

use crate::compiler::PlanResult;
use crate::config::Settings;
use crate::filtergraph::{compile_overlays, BannerOverlay, LogoOverlay, OverlayRequest};
use crate::logging::Diagnostics;
use crate::models::{StreamKind, TargetParams, TrackEdit};
use crate::plan::{PipelineStep, StepId, StepKind};
use crate::planner::BannerWindow;

use super::encoding::{final_codec_args, hwaccel_args};
use super::finalize::finalize_step;
use super::inputs::{declare_inputs, LogoInput};
use super::metadata::metadata_args;
use super::stream_map::{StreamIndexMap, StreamRef};

/// Banner track produced earlier in the plan.
#[derive(Debug, Clone, Copy)]
pub struct BannerInput<'a> {
    pub path: &'a Path,
    pub windows: &'a [BannerWindow],
}

/// Everything the final render depends on.
#[derive(Debug, Clone, Copy)]
pub struct FinalRenderRequest<'a> {
    pub main: &'a Path,
    pub output: &'a Path,
    pub target: &'a TargetParams,
    pub final_duration: f64,
    pub concat_list: Option<&'a Path>,
    pub banner: Option<BannerInput<'a>>,
    pub logo: Option<LogoInput<'a>>,
    /// Subtitle streams in the main file, all copied through.
    pub subtitle_count: usize,
    pub track_edits: &'a BTreeMap<String, TrackEdit>,
    pub settings: &'a Settings,
    pub depends_on: &'a [StepId],
}

#[derive(Debug, Clone)]
pub struct FinalRender {
    pub step: PipelineStep,
    pub streams: StreamIndexMap,
}

/// Assemble the final step: inputs, overlay graph, maps, metadata, codecs.
pub fn assemble_final(request: &FinalRenderRequest<'_>, diag: &mut Diagnostics) -> PlanResult<FinalRender> {
    let target = request.target;
    let needs_original =
        request.subtitle_count > 0 || request.track_edits.values().any(|e| !e.is_empty());
    let inputs = declare_inputs(
        request.main,
        request.concat_list,
        needs_original,
        request.banner.map(|b| b.path),
        request.logo,
        target,
    );
    let meta = inputs.metadata_source;

    let mut step = PipelineStep::new("Final render", StepKind::FinalRender, request.output);
    step.global_args = hwaccel_args(&request.settings.encoding);
    step.inputs = inputs.clauses.clone();
    step.depends_on = request.depends_on.to_vec();

    let base_video = StreamRef::new(inputs.primary, StreamKind::Video, 0);
    let base_label = base_video.to_string();
    let overlay = OverlayRequest {
        base_video: &base_label,
        target,
        final_duration: request.final_duration,
        banner: inputs.banner.zip(request.banner).map(|(input, banner)| BannerOverlay {
            input,
            windows: banner.windows,
        }),
        logo: inputs.logo.map(|input| LogoOverlay { input }),
        settings: &request.settings.overlay,
    };

    // Origins are the streams actually read. The overlay output stands in for
    // the metadata source's video.
    let mut streams = StreamIndexMap::new();
    let video_origin = match compile_overlays(&overlay, diag) {
        Some(compiled) => {
            step.maps.push(format!("[{}]", compiled.video_output));
            step.filter_graph = Some(compiled.graph);
            StreamRef::new(meta, StreamKind::Video, 0)
        }
        None => {
            step.maps.push(base_video.optional_spec());
            base_video
        }
    };
    streams.record(StreamKind::Video, Some(video_origin));

    let audio_mapped = target.has_audio();
    if audio_mapped {
        let audio = StreamRef::new(inputs.primary, StreamKind::Audio, 0);
        step.maps.push(audio.optional_spec());
        streams.record(StreamKind::Audio, Some(audio));
    } else {
        step.codec_args.push("-an".to_string());
    }

    for index in 0..request.subtitle_count {
        let subtitle = StreamRef::new(meta, StreamKind::Subtitle, index);
        step.maps.push(subtitle.optional_spec());
        streams.record(StreamKind::Subtitle, Some(subtitle));
    }

    step.codec_args
        .extend(final_codec_args(&request.settings.encoding, audio_mapped)?);
    if request.subtitle_count > 0 {
        step.codec_args.push("-c:s".to_string());
        step.codec_args.push("copy".to_string());
    }

    step.output_args = metadata_args(request.track_edits, &streams, meta, diag);
    finalize_step(&mut step, request.final_duration);

    Ok(FinalRender { step, streams })
}
