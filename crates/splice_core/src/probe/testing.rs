//! In-memory probe for unit tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::types::{MediaProbe, ProbeError, ProbeReport, ProbeResult};
use crate::models::{Rational, StreamDescriptor};

#[derive(Default)]
pub struct FakeProbe {
    reports: HashMap<PathBuf, ProbeReport>,
    existing: HashSet<PathBuf>,
    inspections: Mutex<HashMap<PathBuf, usize>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing file with the given descriptor and duration.
    pub fn with_media(
        mut self,
        path: impl Into<PathBuf>,
        descriptor: StreamDescriptor,
        duration: Option<f64>,
    ) -> Self {
        self.with_report(
            path,
            ProbeReport {
                descriptor: Some(descriptor),
                duration,
                subtitle_count: 0,
            },
        )
    }

    pub fn with_report(mut self, path: impl Into<PathBuf>, report: ProbeReport) -> Self {
        let path = path.into();
        self.existing.insert(path.clone());
        self.reports.insert(path, report);
        self
    }

    /// A file that exists but cannot be probed.
    pub fn with_unprobeable(mut self, path: impl Into<PathBuf>) -> Self {
        self.existing.insert(path.into());
        self
    }

    /// How many times `inspect` ran for `path`.
    pub fn inspections(&self, path: impl AsRef<Path>) -> usize {
        self.inspections.lock().get(path.as_ref()).copied().unwrap_or(0)
    }
}

impl MediaProbe for FakeProbe {
    fn inspect(&self, path: &Path) -> ProbeResult<ProbeReport> {
        *self.inspections.lock().entry(path.to_path_buf()).or_insert(0) += 1;
        self.reports
            .get(path)
            .cloned()
            .ok_or_else(|| ProbeError::FileNotFound(path.to_path_buf()))
    }

    fn exists(&self, path: &Path) -> bool {
        self.existing.contains(path)
    }
}

/// 1080p25 video with stereo AAC-style audio.
pub fn hd_descriptor() -> StreamDescriptor {
    StreamDescriptor {
        width: Some(1920),
        height: Some(1080),
        pix_fmt: Some("yuv420p".to_string()),
        sar: Some(Rational::new(1, 1)),
        fps: Some(Rational::new(25, 1)),
        video_timebase: Some(Rational::new(1, 12800)),
        sample_rate: Some(48000),
        channel_layout: Some("stereo".to_string()),
        sample_fmt: Some("fltp".to_string()),
        audio_timebase: Some(Rational::new(1, 48000)),
        has_audio: true,
        is_image: false,
    }
}

/// Video-only descriptor of the given size.
pub fn silent_descriptor(width: u32, height: u32) -> StreamDescriptor {
    StreamDescriptor {
        width: Some(width),
        height: Some(height),
        pix_fmt: Some("yuv420p".to_string()),
        sar: Some(Rational::new(1, 1)),
        fps: Some(Rational::new(30, 1)),
        video_timebase: Some(Rational::new(1, 15360)),
        ..Default::default()
    }
}

/// Still image descriptor as the adapter reports it.
pub fn image_descriptor(width: u32, height: u32) -> StreamDescriptor {
    StreamDescriptor {
        width: Some(width),
        height: Some(height),
        pix_fmt: Some("rgba".to_string()),
        sar: Some(Rational::new(1, 1)),
        fps: Some(Rational::new(25, 1)),
        video_timebase: Some(Rational::new(1, 25)),
        is_image: true,
        ..Default::default()
    }
}
