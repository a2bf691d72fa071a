//! Target parameter negotiation from the main video's descriptor.

use crate::compiler::{PlanResult, PlanningError};
use crate::logging::Diagnostics;
use crate::models::{AudioTarget, StreamDescriptor, TargetParams};

/// Pixel formats passed through unchanged.
const COMMON_PIX_FMTS: &[&str] = &[
    "yuv420p",
    "yuvj420p",
    "yuv422p",
    "yuvj422p",
    "yuv444p",
    "yuvj444p",
    "nv12",
    "nv21",
    "yuva420p",
    "rgba",
    "bgra",
    "rgb24",
    "gray",
    "gbrp",
    "yuv420p10le",
];

/// Substitute for anything outside [`COMMON_PIX_FMTS`].
pub const FALLBACK_PIX_FMT: &str = "yuv420p";

/// Track timescale used when the time base does not give a sane one.
pub const FALLBACK_TIMESCALE: u32 = 90_000;

const MIN_TIMESCALE: f64 = 1_000.0;
const MAX_TIMESCALE: f64 = 1_000_000.0;

/// Derive the output target from the main video.
///
/// Video geometry is mandatory. Audio is carried only when all four audio
/// fields resolved; otherwise the target has no audio at all.
pub fn negotiate(main: &StreamDescriptor, diag: &mut Diagnostics) -> PlanResult<TargetParams> {
    let mut missing = Vec::new();
    if main.width.filter(|w| *w > 0).is_none() {
        missing.push("width");
    }
    if main.height.filter(|h| *h > 0).is_none() {
        missing.push("height");
    }
    if main.fps.filter(|r| r.is_positive()).is_none() {
        missing.push("fps");
    }
    if main.pix_fmt.as_deref().filter(|p| !p.is_empty()).is_none() {
        missing.push("pix_fmt");
    }
    if main.video_timebase.filter(|r| r.is_positive()).is_none() {
        missing.push("timebase");
    }
    if main.sar.filter(|r| r.is_positive()).is_none() {
        missing.push("sar");
    }

    let (Some(width), Some(height), Some(fps), Some(pix_fmt), Some(timebase), Some(sar)) = (
        main.width,
        main.height,
        main.fps,
        main.pix_fmt.as_deref(),
        main.video_timebase,
        main.sar,
    ) else {
        return Err(PlanningError::MissingVideoParams { missing });
    };
    if !missing.is_empty() {
        return Err(PlanningError::MissingVideoParams { missing });
    }

    let pix_fmt = if COMMON_PIX_FMTS.contains(&pix_fmt) {
        pix_fmt.to_string()
    } else {
        diag.warn(format!(
            "Pixel format '{}' is uncommon, using {} instead",
            pix_fmt, FALLBACK_PIX_FMT
        ));
        FALLBACK_PIX_FMT.to_string()
    };

    let video_timescale = timebase
        .inverse_f64()
        .map(f64::round)
        .filter(|ts| *ts > MIN_TIMESCALE && *ts < MAX_TIMESCALE)
        .map(|ts| ts as u32)
        .unwrap_or_else(|| {
            diag.debug(format!(
                "Time base {} gives no usable timescale, using {}",
                timebase, FALLBACK_TIMESCALE
            ));
            FALLBACK_TIMESCALE
        });

    let audio = negotiate_audio(main);
    if audio.is_none() {
        diag.info("Main video has no complete audio stream; output will be silent");
    }

    let target = TargetParams {
        width,
        height,
        pix_fmt,
        sar,
        fps,
        video_timebase: timebase,
        video_timescale,
        audio,
    };
    diag.info(format!(
        "Target: {}x{} {} @ {} fps, sar {}, timescale {}{}",
        target.width,
        target.height,
        target.pix_fmt,
        target.fps,
        target.sar.to_colon_string(),
        target.video_timescale,
        target
            .audio
            .as_ref()
            .map(|a| format!(", audio {} Hz {} {}", a.sample_rate, a.channel_layout, a.sample_fmt))
            .unwrap_or_default()
    ));
    Ok(target)
}

fn negotiate_audio(main: &StreamDescriptor) -> Option<AudioTarget> {
    match (
        main.sample_rate,
        main.channel_layout.as_ref(),
        main.sample_fmt.as_ref(),
        main.audio_timebase,
    ) {
        (Some(sample_rate), Some(layout), Some(fmt), Some(tb)) if tb.is_positive() => {
            Some(AudioTarget {
                sample_rate,
                channel_layout: layout.clone(),
                sample_fmt: fmt.clone(),
                timebase: tb,
            })
        }
        _ => None,
    }
}
