//! Job request structures (what the user asked to render).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// An ad to splice into the main video at an original-timeline timecode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdRequest {
    /// `MM:SS` or `HH:MM:SS` on the main video's timeline.
    pub timecode: String,
    pub path: PathBuf,
}

/// A banner shown along the bottom edge at each timecode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerRequest {
    pub path: PathBuf,
    #[serde(default)]
    pub timecodes: Vec<String>,
}

/// A logo that travels around the frame for the whole render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoRequest {
    pub path: PathBuf,
}

/// Title/language edit for one source track.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl TrackEdit {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.language.is_none()
    }
}

/// Everything needed to plan one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(default)]
    pub ads: Vec<AdRequest>,
    #[serde(default)]
    pub banner: Option<BannerRequest>,
    #[serde(default)]
    pub logo: Option<LogoRequest>,
    /// Keyed by source track, `type:index` or `input:type:index` (e.g. `a:0`, `0:s:1`).
    #[serde(default)]
    pub track_edits: BTreeMap<String, TrackEdit>,
}

impl JobRequest {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ads: Vec::new(),
            banner: None,
            logo: None,
            track_edits: BTreeMap::new(),
        }
    }

    pub fn with_ad(mut self, timecode: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.ads.push(AdRequest {
            timecode: timecode.into(),
            path: path.into(),
        });
        self
    }

    pub fn with_banner<I, S>(mut self, path: impl Into<PathBuf>, timecodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.banner = Some(BannerRequest {
            path: path.into(),
            timecodes: timecodes.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn with_logo(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo = Some(LogoRequest { path: path.into() });
        self
    }

    pub fn with_track_edit(mut self, track: impl Into<String>, edit: TrackEdit) -> Self {
        self.track_edits.insert(track.into(), edit);
        self
    }

    /// Name used for the job's log file and temp directory.
    pub fn name(&self) -> String {
        job_name_for(&self.input)
    }
}

fn job_name_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "job".to_string())
}
