//! Core enums used throughout the compiler.

use serde::{Deserialize, Serialize};

/// Kind of elementary stream, as addressed by ffmpeg stream specifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
}

impl StreamKind {
    /// Single-letter code used in stream specifiers (`v`, `a`, `s`).
    pub fn code(&self) -> char {
        match self {
            StreamKind::Video => 'v',
            StreamKind::Audio => 'a',
            StreamKind::Subtitle => 's',
        }
    }

    /// Parse a specifier code or a spelled-out kind name.
    pub fn from_code(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "v" | "video" => Some(StreamKind::Video),
            "a" | "audio" => Some(StreamKind::Audio),
            "s" | "subtitle" | "subtitles" => Some(StreamKind::Subtitle),
            _ => None,
        }
    }

    /// Stream kind named by an ffprobe `codec_type`.
    pub fn from_codec_type(codec_type: &str) -> Option<Self> {
        match codec_type {
            "video" => Some(StreamKind::Video),
            "audio" => Some(StreamKind::Audio),
            "subtitle" => Some(StreamKind::Subtitle),
            _ => None,
        }
    }
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamKind::Video => write!(f, "video"),
            StreamKind::Audio => write!(f, "audio"),
            StreamKind::Subtitle => write!(f, "subtitle"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for kind in [StreamKind::Video, StreamKind::Audio, StreamKind::Subtitle] {
            assert_eq!(StreamKind::from_code(&kind.code().to_string()), Some(kind));
        }
    }

    #[test]
    fn accepts_spelled_out_names() {
        assert_eq!(StreamKind::from_code("Audio"), Some(StreamKind::Audio));
        assert_eq!(StreamKind::from_code("subtitles"), Some(StreamKind::Subtitle));
        assert_eq!(StreamKind::from_code("d"), None);
    }
}
