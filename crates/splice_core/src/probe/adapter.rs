//! Normalization of `ffprobe -show_streams -show_format -of json` output.

use serde_json::Value;

use super::types::ProbeReport;
use crate::models::{Rational, StreamDescriptor};

/// Container names ffprobe reports for still images.
const IMAGE_FORMATS: &[&str] = &[
    "image2",
    "png_pipe",
    "mjpeg",
    "webp_pipe",
    "gif",
    "tiff_pipe",
    "bmp_pipe",
    "jpeg_pipe",
    "ppm_pipe",
    "pgm_pipe",
    "pbm_pipe",
    "apng",
];

const IMAGE_FPS: Rational = Rational::new(25, 1);
const IMAGE_TIMEBASE: Rational = Rational::new(1, 25);
const SQUARE_PIXELS: Rational = Rational::new(1, 1);

/// Shorter durations are treated as "no duration" (stills, broken headers).
const MIN_DURATION: f64 = 0.01;

/// Build a probe report from ffprobe's JSON document.
pub fn report_from_json(json: &Value) -> ProbeReport {
    let streams = json
        .get("streams")
        .and_then(|s| s.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let format = json.get("format");

    let is_image = format
        .and_then(|f| f.get("format_name"))
        .and_then(|n| n.as_str())
        .is_some_and(is_image_format);

    let video = streams
        .iter()
        .find(|s| codec_type(s) == Some("video") && !is_attached_picture(s));
    let audio = streams.iter().find(|s| codec_type(s) == Some("audio"));

    let descriptor = if streams.is_empty() {
        None
    } else {
        let mut desc = StreamDescriptor {
            is_image,
            ..Default::default()
        };
        if let Some(v) = video {
            fill_video(&mut desc, v, is_image);
        }
        if let Some(a) = audio {
            fill_audio(&mut desc, a);
        }
        Some(desc)
    };

    let duration = format
        .and_then(|f| number_field(f, "duration"))
        .or_else(|| video.and_then(|v| number_field(v, "duration")))
        .filter(|d| *d > MIN_DURATION);

    let subtitle_count = streams
        .iter()
        .filter(|s| codec_type(s) == Some("subtitle"))
        .count();

    ProbeReport {
        descriptor,
        duration,
        subtitle_count,
    }
}

fn is_image_format(format_name: &str) -> bool {
    format_name
        .split(',')
        .any(|name| IMAGE_FORMATS.contains(&name.trim()))
}

fn codec_type(stream: &Value) -> Option<&str> {
    stream.get("codec_type").and_then(|t| t.as_str())
}

fn is_attached_picture(stream: &Value) -> bool {
    stream
        .get("disposition")
        .and_then(|d| d.get("attached_pic"))
        .and_then(|a| a.as_i64())
        == Some(1)
}

fn fill_video(desc: &mut StreamDescriptor, v: &Value, is_image: bool) {
    desc.width = uint_field(v, "width");
    desc.height = uint_field(v, "height");

    let pix_fmt = str_field(v, "pix_fmt").filter(|p| !p.is_empty() && p != "unknown");
    let fallback_pix_fmt = if is_image { "rgb24" } else { "yuv420p" };
    desc.pix_fmt = Some(pix_fmt.unwrap_or_else(|| fallback_pix_fmt.to_string()));

    desc.sar = Some(
        str_field(v, "sample_aspect_ratio")
            .and_then(|s| Rational::parse_positive(&s))
            .unwrap_or(SQUARE_PIXELS),
    );

    if is_image {
        desc.fps = Some(IMAGE_FPS);
        desc.video_timebase = Some(IMAGE_TIMEBASE);
        desc.sar = Some(SQUARE_PIXELS);
    } else {
        desc.fps = str_field(v, "r_frame_rate")
            .and_then(|r| Rational::parse_positive(&r))
            .or_else(|| str_field(v, "avg_frame_rate").and_then(|r| Rational::parse_positive(&r)));
        desc.video_timebase =
            str_field(v, "time_base").and_then(|tb| Rational::parse_positive(&tb));
    }
}

fn fill_audio(desc: &mut StreamDescriptor, a: &Value) {
    desc.sample_rate = uint_field(a, "sample_rate").filter(|r| *r > 0);
    desc.channel_layout = str_field(a, "channel_layout").filter(|l| !l.is_empty());
    desc.sample_fmt = str_field(a, "sample_fmt").filter(|f| !f.is_empty());
    desc.audio_timebase = str_field(a, "time_base").and_then(|tb| Rational::parse_positive(&tb));

    desc.has_audio = desc.sample_rate.is_some()
        && desc.channel_layout.is_some()
        && desc.sample_fmt.is_some()
        && desc.audio_timebase.is_some();
}

fn str_field(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(|x| x.as_str()).map(str::to_string)
}

/// ffprobe prints some numbers as strings (`"sample_rate": "48000"`).
fn number_field(v: &Value, key: &str) -> Option<f64> {
    match v.get(key)? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn uint_field(v: &Value, key: &str) -> Option<u32> {
    number_field(v, key)
        .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32)
}
