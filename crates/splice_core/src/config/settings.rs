//! Settings struct with TOML-based sections.
//!
//! Each section maps to one TOML table and can be rewritten on its own.

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub paths: PathSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub encoding: EncodingSettings,

    #[serde(default)]
    pub overlay: OverlaySettings,

    #[serde(default)]
    pub policy: PolicySettings,
}

/// Tool locations and working directories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root under which each job gets its own temp directory.
    #[serde(default = "default_temp_root")]
    pub temp_root: String,

    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_path: String,

    #[serde(default = "default_ffprobe")]
    pub ffprobe_path: String,
}

fn default_temp_root() -> String {
    ".temp".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            temp_root: default_temp_root(),
            logs_folder: default_logs_folder(),
            ffmpeg_path: default_ffmpeg(),
            ffprobe_path: default_ffprobe(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Keep ffmpeg output out of the job log unless a step fails.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of stderr lines attached to a failed step.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Print every generated command before running it.
    #[serde(default = "default_true")]
    pub show_commands: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            show_commands: true,
        }
    }
}

/// Encoder profile for the final render and the intermediate segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingSettings {
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    #[serde(default = "default_video_preset")]
    pub video_preset: String,

    /// Constant-quality value. Used only when no bitrate is set.
    #[serde(default = "default_video_cq")]
    pub video_cq: String,

    /// Target bitrate such as `6M`. Empty or `0` means unset.
    #[serde(default)]
    pub video_bitrate: String,

    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// Output frame-rate override passed verbatim to `-r`.
    #[serde(default)]
    pub video_fps: String,

    /// `-hwaccel` mode. Empty or `none` disables the flag.
    #[serde(default = "default_hwaccel")]
    pub hwaccel: String,

    /// Extra encoder parameters appended after the generated ones.
    #[serde(default)]
    pub additional_params: String,

    /// Raw encoder parameters that replace every generated codec option.
    #[serde(default)]
    pub manual_params: String,
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_video_preset() -> String {
    "fast".to_string()
}

fn default_video_cq() -> String {
    "24".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_audio_bitrate() -> String {
    "192k".to_string()
}

fn default_hwaccel() -> String {
    "auto".to_string()
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self {
            video_codec: default_video_codec(),
            video_preset: default_video_preset(),
            video_cq: default_video_cq(),
            video_bitrate: String::new(),
            audio_codec: default_audio_codec(),
            audio_bitrate: default_audio_bitrate(),
            video_fps: String::new(),
            hwaccel: default_hwaccel(),
            additional_params: String::new(),
            manual_params: String::new(),
        }
    }
}

impl EncodingSettings {
    /// Bitrate when one is configured (`0` counts as unset).
    pub fn bitrate(&self) -> Option<&str> {
        let b = self.video_bitrate.trim();
        (!b.is_empty() && b != "0").then_some(b)
    }

    pub fn cq(&self) -> Option<&str> {
        let cq = self.video_cq.trim();
        (!cq.is_empty()).then_some(cq)
    }
}

/// Banner and moving-logo appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySettings {
    /// Full laps of the frame perimeter over the whole render.
    #[serde(default = "default_moving_speed")]
    pub moving_speed: f64,

    /// Logo height as a fraction of the output height.
    #[serde(default = "default_logo_relative_height")]
    pub logo_relative_height: f64,

    /// Logo opacity, clamped to [0, 1].
    #[serde(default = "default_logo_alpha")]
    pub logo_alpha: f64,

    #[serde(default)]
    pub motion_blur: bool,

    #[serde(default = "default_blur_intensity")]
    pub blur_intensity: f64,

    /// Pixel format of the banner track. Must carry alpha.
    #[serde(default = "default_banner_pix_fmt")]
    pub banner_pix_fmt: String,

    #[serde(default = "default_banner_gap_color")]
    pub banner_gap_color: String,

    /// Intermediate codec for banner clips and gaps.
    #[serde(default = "default_banner_codec")]
    pub banner_codec: String,
}

fn default_moving_speed() -> f64 {
    2.0
}

fn default_logo_relative_height() -> f64 {
    1.0 / 12.0
}

fn default_logo_alpha() -> f64 {
    0.5
}

fn default_blur_intensity() -> f64 {
    1.0
}

fn default_banner_pix_fmt() -> String {
    "yuva420p".to_string()
}

fn default_banner_gap_color() -> String {
    "black@0.0".to_string()
}

fn default_banner_codec() -> String {
    "ffv1".to_string()
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            moving_speed: default_moving_speed(),
            logo_relative_height: default_logo_relative_height(),
            logo_alpha: default_logo_alpha(),
            motion_blur: false,
            blur_intensity: default_blur_intensity(),
            banner_pix_fmt: default_banner_pix_fmt(),
            banner_gap_color: default_banner_gap_color(),
            banner_codec: default_banner_codec(),
        }
    }
}

/// Fallbacks applied when probing fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySettings {
    /// Seconds assumed for an ad or banner whose duration cannot be probed.
    #[serde(default = "default_media_duration")]
    pub default_media_duration: f64,

    /// Leave intermediate files on disk after a successful run.
    #[serde(default)]
    pub keep_temp_files: bool,
}

pub const DEFAULT_MEDIA_DURATION: f64 = 5.0;

fn default_media_duration() -> f64 {
    DEFAULT_MEDIA_DURATION
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            default_media_duration: DEFAULT_MEDIA_DURATION,
            keep_temp_files: false,
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Encoding,
    Overlay,
    Policy,
}

impl ConfigSection {
    pub const ALL: [ConfigSection; 5] = [
        ConfigSection::Paths,
        ConfigSection::Logging,
        ConfigSection::Encoding,
        ConfigSection::Overlay,
        ConfigSection::Policy,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Encoding => "encoding",
            ConfigSection::Overlay => "overlay",
            ConfigSection::Policy => "policy",
        }
    }

    /// Comment written above the table in generated files.
    pub fn description(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Tool locations and working directories",
            ConfigSection::Logging => "Logging configuration",
            ConfigSection::Encoding => "Encoder profile",
            ConfigSection::Overlay => "Banner and moving logo appearance",
            ConfigSection::Policy => "Fallbacks for unprobeable media",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let toml = toml::to_string_pretty(&Settings::default()).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[encoding]"));
        assert!(toml.contains("moving_speed"));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[encoding]\nvideo_codec = \"h264_nvenc\"";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        assert_eq!(parsed.encoding.video_codec, "h264_nvenc");
        assert_eq!(parsed.encoding.audio_bitrate, "192k");
        assert_eq!(parsed.policy.default_media_duration, 5.0);
        assert_eq!(parsed.overlay.banner_pix_fmt, "yuva420p");
    }

    #[test]
    fn zero_bitrate_counts_as_unset() {
        let mut enc = EncodingSettings::default();
        assert_eq!(enc.bitrate(), None);
        enc.video_bitrate = "0".to_string();
        assert_eq!(enc.bitrate(), None);
        enc.video_bitrate = "6M".to_string();
        assert_eq!(enc.bitrate(), Some("6M"));
    }
}
