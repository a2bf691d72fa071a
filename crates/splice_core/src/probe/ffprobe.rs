//! `MediaProbe` backed by the ffprobe binary.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use parking_lot::Mutex;
use serde_json::Value;

use super::adapter::report_from_json;
use super::types::{MediaProbe, ProbeError, ProbeReport, ProbeResult};

/// Runs `ffprobe` at most once per file.
///
/// Failures are remembered like successes; later queries for the same file
/// get [`ProbeError::Failed`] without running the tool again.
pub struct FfprobeProbe {
    ffprobe_path: PathBuf,
    cache: Mutex<HashMap<PathBuf, Result<ProbeReport, String>>>,
}

impl FfprobeProbe {
    pub fn new(ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn run_ffprobe(&self, path: &Path) -> ProbeResult<Value> {
        let tool = self.ffprobe_path.display().to_string();
        tracing::debug!("Probing file: {}", path.display());

        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-show_streams", "-show_format", "-of", "json"])
            .arg(path)
            .output()
            .map_err(|source| ProbeError::Spawn {
                tool: tool.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProbeError::CommandFailed {
                tool,
                exit_code: output.status.code().unwrap_or(-1),
                message: stderr.trim().to_string(),
            });
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl MediaProbe for FfprobeProbe {
    fn inspect(&self, path: &Path) -> ProbeResult<ProbeReport> {
        if let Some(cached) = self.cache.lock().get(path) {
            return cached.clone().map_err(|message| ProbeError::Failed {
                path: path.to_path_buf(),
                message,
            });
        }
        if !path.exists() {
            return Err(ProbeError::FileNotFound(path.to_path_buf()));
        }

        let result = self.run_ffprobe(path).map(|json| report_from_json(&json));
        let cached = result.as_ref().map(Clone::clone).map_err(ToString::to_string);
        self.cache.lock().insert(path.to_path_buf(), cached);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported() {
        let probe = FfprobeProbe::default();
        let err = probe
            .inspect(Path::new("/definitely/not/here.mp4"))
            .unwrap_err();
        assert!(matches!(err, ProbeError::FileNotFound(_)));
        assert!(probe.probe(Path::new("/definitely/not/here.mp4")).is_none());
    }

    #[test]
    fn spawn_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("clip.mp4");
        std::fs::write(&file, b"not a video").unwrap();

        let probe = FfprobeProbe::new(dir.path().join("no-such-ffprobe"));
        let err = probe.inspect(&file).unwrap_err();
        assert!(matches!(err, ProbeError::Spawn { .. }));
        assert!(matches!(probe.inspect(&file).unwrap_err(), ProbeError::Failed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn failed_probe_is_not_rerun() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.mkv");
        std::fs::write(&file, b"garbage").unwrap();
        let calls = dir.path().join("calls");
        let script = dir.path().join("ffprobe");
        std::fs::write(
            &script,
            format!("#!/bin/sh\necho run >> '{}'\nexit 1\n", calls.display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let probe = FfprobeProbe::new(&script);
        assert!(probe.probe(&file).is_none());
        assert!(probe.duration(&file).is_none());
        assert_eq!(probe.subtitle_count(&file), 0);
        assert!(matches!(
            probe.inspect(&file).unwrap_err(),
            ProbeError::Failed { .. }
        ));

        let runs = std::fs::read_to_string(&calls).unwrap();
        assert_eq!(runs.lines().count(), 1);
    }
}
