//! Codec and rate-control arguments from the encoding profile.

use crate::compiler::{PlanResult, PlanningError};
use crate::config::EncodingSettings;

/// Codec used for intermediates when the profile asks for stream copy,
/// which cannot follow a filter chain.
const SEGMENT_VIDEO_FALLBACK: &str = "libx264";
const SEGMENT_AUDIO_FALLBACK: &str = "aac";

/// CRF for segments when the profile sets neither CQ nor bitrate.
const SEGMENT_DEFAULT_CRF: &str = "18";

fn push_pair(args: &mut Vec<String>, flag: &str, value: &str) {
    args.push(flag.to_string());
    args.push(value.to_string());
}

fn encodable<'a>(codec: &'a str, fallback: &'a str) -> &'a str {
    let codec = codec.trim();
    if codec.is_empty() || codec == "copy" {
        fallback
    } else {
        codec
    }
}

/// Tokenize a user parameter string with shell rules.
pub fn split_params(what: &str, text: &str) -> PlanResult<Vec<String>> {
    shell_words::split(text)
        .map_err(|e| PlanningError::invalid_parameters(what, e.to_string()))
}

/// Codec args for an intermediate segment or ad transcode.
///
/// CQ takes priority here, then bitrate, then a fixed CRF.
pub fn segment_codec_args(encoding: &EncodingSettings, with_audio: bool) -> Vec<String> {
    let mut args = Vec::new();
    push_pair(
        &mut args,
        "-c:v",
        encodable(&encoding.video_codec, SEGMENT_VIDEO_FALLBACK),
    );
    let preset = encoding.video_preset.trim();
    if !preset.is_empty() {
        push_pair(&mut args, "-preset", preset);
    }
    if let Some(cq) = encoding.cq() {
        push_pair(&mut args, "-cq:v", cq);
    } else if let Some(bitrate) = encoding.bitrate() {
        push_pair(&mut args, "-b:v", bitrate);
    } else {
        push_pair(&mut args, "-crf", SEGMENT_DEFAULT_CRF);
    }
    if with_audio {
        push_pair(
            &mut args,
            "-c:a",
            encodable(&encoding.audio_codec, SEGMENT_AUDIO_FALLBACK),
        );
        let bitrate = encoding.audio_bitrate.trim();
        if !bitrate.is_empty() {
            push_pair(&mut args, "-b:a", bitrate);
        }
    }
    args
}

/// Codec args for the final render.
///
/// A non-empty manual override replaces everything generated here. Otherwise
/// bitrate takes priority over CQ, audio options appear only when an audio
/// stream is mapped, and additional parameters are appended last.
pub fn final_codec_args(encoding: &EncodingSettings, audio_mapped: bool) -> PlanResult<Vec<String>> {
    if !encoding.manual_params.trim().is_empty() {
        return split_params("manual encoding parameters", &encoding.manual_params);
    }

    let mut args = Vec::new();
    let codec = encoding.video_codec.trim();
    if !codec.is_empty() {
        push_pair(&mut args, "-c:v", codec);
    }
    let preset = encoding.video_preset.trim();
    if !preset.is_empty() && codec != "copy" {
        push_pair(&mut args, "-preset", preset);
    }
    if codec != "copy" {
        if let Some(bitrate) = encoding.bitrate() {
            push_pair(&mut args, "-b:v", bitrate);
        } else if let Some(cq) = encoding.cq() {
            push_pair(&mut args, "-cq:v", cq);
            push_pair(&mut args, "-crf", cq);
            push_pair(&mut args, "-b:v", "0");
        }
    }

    if audio_mapped {
        let audio_codec = encoding.audio_codec.trim();
        if !audio_codec.is_empty() {
            push_pair(&mut args, "-c:a", audio_codec);
        }
        let audio_bitrate = encoding.audio_bitrate.trim();
        if audio_codec != "copy" && !audio_bitrate.is_empty() {
            push_pair(&mut args, "-b:a", audio_bitrate);
        }
    }

    let fps = encoding.video_fps.trim();
    if !fps.is_empty() {
        push_pair(&mut args, "-r", fps);
    }

    if !encoding.additional_params.trim().is_empty() {
        args.extend(split_params(
            "additional encoding parameters",
            &encoding.additional_params,
        )?);
    }
    Ok(args)
}

/// `-hwaccel <mode>` unless disabled.
pub fn hwaccel_args(encoding: &EncodingSettings) -> Vec<String> {
    let mode = encoding.hwaccel.trim();
    if mode.is_empty() || mode.eq_ignore_ascii_case("none") {
        Vec::new()
    } else {
        vec!["-hwaccel".to_string(), mode.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> EncodingSettings {
        EncodingSettings::default()
    }

    #[test]
    fn segment_args_prefer_cq_then_bitrate_then_crf() {
        let mut enc = profile();
        assert_eq!(
            segment_codec_args(&enc, true),
            vec!["-c:v", "libx264", "-preset", "fast", "-cq:v", "24", "-c:a", "aac", "-b:a", "192k"]
        );

        enc.video_cq.clear();
        enc.video_bitrate = "8M".to_string();
        assert!(segment_codec_args(&enc, false).ends_with(&["-b:v".to_string(), "8M".to_string()]));

        enc.video_bitrate.clear();
        let args = segment_codec_args(&enc, false);
        assert!(args.ends_with(&["-crf".to_string(), "18".to_string()]));
        assert!(!args.contains(&"-c:a".to_string()));
    }

    #[test]
    fn segment_args_never_stream_copy() {
        let mut enc = profile();
        enc.video_codec = "copy".to_string();
        enc.audio_codec = "copy".to_string();
        let args = segment_codec_args(&enc, true);
        assert_eq!(&args[..2], &["-c:v", "libx264"]);
        assert!(args.windows(2).any(|w| w == ["-c:a", "aac"]));
    }

    #[test]
    fn final_args_bitrate_wins_over_cq() {
        let mut enc = profile();
        enc.video_bitrate = "6M".to_string();
        let args = final_codec_args(&enc, false).unwrap();
        assert_eq!(args, vec!["-c:v", "libx264", "-preset", "fast", "-b:v", "6M"]);
    }

    #[test]
    fn final_args_cq_sets_rate_control_triplet() {
        let args = final_codec_args(&profile(), true).unwrap();
        assert_eq!(
            args,
            vec![
                "-c:v", "libx264", "-preset", "fast", "-cq:v", "24", "-crf", "24", "-b:v", "0",
                "-c:a", "aac", "-b:a", "192k"
            ]
        );
    }

    #[test]
    fn final_args_skip_audio_bitrate_for_copy() {
        let mut enc = profile();
        enc.audio_codec = "copy".to_string();
        let args = final_codec_args(&enc, true).unwrap();
        assert!(args.windows(2).any(|w| w == ["-c:a", "copy"]));
        assert!(!args.contains(&"-b:a".to_string()));
    }

    #[test]
    fn final_args_append_fps_and_additional() {
        let mut enc = profile();
        enc.video_fps = "30".to_string();
        enc.additional_params = "-tune film -x264-params \"keyint=60:min-keyint=60\"".to_string();
        let args = final_codec_args(&enc, false).unwrap();
        let tail: Vec<&str> = args.iter().rev().take(6).rev().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec!["-r", "30", "-tune", "film", "-x264-params", "keyint=60:min-keyint=60"]
        );
    }

    #[test]
    fn manual_override_replaces_everything() {
        let mut enc = profile();
        enc.manual_params = "-c:v libx265 -crf 20".to_string();
        enc.additional_params = "-tune film".to_string();
        let args = final_codec_args(&enc, true).unwrap();
        assert_eq!(args, vec!["-c:v", "libx265", "-crf", "20"]);
    }

    #[test]
    fn unbalanced_quote_is_a_planning_error() {
        let mut enc = profile();
        enc.manual_params = "-metadata title='oops".to_string();
        let err = final_codec_args(&enc, false).unwrap_err();
        assert!(matches!(err, PlanningError::InvalidParameters { .. }));
    }

    #[test]
    fn hwaccel_disabled_by_none_or_empty() {
        let mut enc = profile();
        assert_eq!(hwaccel_args(&enc), vec!["-hwaccel", "auto"]);
        enc.hwaccel = "none".to_string();
        assert!(hwaccel_args(&enc).is_empty());
        enc.hwaccel = String::new();
        assert!(hwaccel_args(&enc).is_empty());
    }
}
