//! Media-related data structures (stream geometry, negotiated targets).

use std::fmt;

use serde::{Deserialize, Serialize};

/// An exact ratio such as a frame rate (`24000/1001`), time base or aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rational {
    pub num: i64,
    pub den: i64,
}

impl Rational {
    pub const fn new(num: i64, den: i64) -> Self {
        Self { num, den }
    }

    /// Parse `N/D` or `N:D`. Zero denominators are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (num, den) = s.split_once('/').or_else(|| s.split_once(':'))?;
        let num: i64 = num.trim().parse().ok()?;
        let den: i64 = den.trim().parse().ok()?;
        if den == 0 {
            return None;
        }
        Some(Self { num, den })
    }

    /// Parse like [`Rational::parse`] but also require both terms to be positive.
    pub fn parse_positive(s: &str) -> Option<Self> {
        Self::parse(s).filter(|r| r.is_positive())
    }

    pub fn is_positive(&self) -> bool {
        self.num > 0 && self.den > 0
    }

    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Reciprocal value as a float, e.g. the tick rate of a time base.
    pub fn inverse_f64(&self) -> Option<f64> {
        if self.num == 0 {
            None
        } else {
            Some(self.den as f64 / self.num as f64)
        }
    }

    /// Ratio rendered with `:` as ffprobe prints aspect ratios.
    pub fn to_colon_string(&self) -> String {
        format!("{}:{}", self.num, self.den)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

/// Normalized probe result for one media file.
///
/// Every field is optional because probing is best-effort; the negotiator
/// decides which absences are fatal for the main video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub pix_fmt: Option<String>,
    pub sar: Option<Rational>,
    pub fps: Option<Rational>,
    pub video_timebase: Option<Rational>,
    pub sample_rate: Option<u32>,
    pub channel_layout: Option<String>,
    pub sample_fmt: Option<String>,
    pub audio_timebase: Option<Rational>,
    pub has_audio: bool,
    /// True when the container is a still-image format.
    #[serde(default)]
    pub is_image: bool,
}

impl StreamDescriptor {
    /// Width and height when both are known and non-zero.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }
}

/// Audio half of the negotiated target. Present only when every field resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioTarget {
    pub sample_rate: u32,
    pub channel_layout: String,
    pub sample_fmt: String,
    pub timebase: Rational,
}

/// Output geometry and format every generated segment conforms to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetParams {
    pub width: u32,
    pub height: u32,
    pub pix_fmt: String,
    pub sar: Rational,
    pub fps: Rational,
    pub video_timebase: Rational,
    /// Integer track timescale handed to the mp4 muxer.
    pub video_timescale: u32,
    pub audio: Option<AudioTarget>,
}

impl TargetParams {
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// Sample aspect ratio in the `N/D` form `setsar` expects.
    pub fn sar_filter_value(&self) -> String {
        format!("{}/{}", self.sar.num, self.sar.den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_frame_rates_and_aspect_ratios() {
        assert_eq!(Rational::parse("24000/1001"), Some(Rational::new(24000, 1001)));
        assert_eq!(Rational::parse("1:1"), Some(Rational::new(1, 1)));
        assert_eq!(Rational::parse("0/0"), None);
        assert_eq!(Rational::parse("abc"), None);
        assert_eq!(Rational::parse_positive("0:1"), None);
    }

    #[test]
    fn display_drops_unit_denominator() {
        assert_eq!(Rational::new(25, 1).to_string(), "25");
        assert_eq!(Rational::new(30000, 1001).to_string(), "30000/1001");
    }

    #[test]
    fn inverse_of_time_base() {
        let tb = Rational::new(1, 12800);
        assert_eq!(tb.inverse_f64(), Some(12800.0));
        assert_eq!(Rational::new(0, 1).inverse_f64(), None);
    }

    #[test]
    fn dimensions_require_both_non_zero() {
        let mut desc = StreamDescriptor {
            width: Some(1920),
            height: Some(1080),
            ..Default::default()
        };
        assert_eq!(desc.dimensions(), Some((1920, 1080)));
        desc.height = Some(0);
        assert_eq!(desc.dimensions(), None);
    }
}
