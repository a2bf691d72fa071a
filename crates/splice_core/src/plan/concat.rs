//! ffconcat list files.

use std::path::{Path, PathBuf};

use super::step::{format_secs, Artifact};

pub const CONCAT_HEADER: &str = "ffconcat version 1.0";

/// Quote a path for a `file` directive.
///
/// Backslashes become forward slashes, single quotes become `'\''`, and the
/// result is wrapped in single quotes.
pub fn escape_concat_path(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    format!("'{}'", normalized.replace('\'', "'\\''"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConcatEntry {
    pub path: PathBuf,
    /// Emitted as a `duration` directive after the file line.
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConcatList {
    entries: Vec<ConcatEntry>,
}

impl ConcatList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<PathBuf>) {
        self.entries.push(ConcatEntry {
            path: path.into(),
            duration: None,
        });
    }

    pub fn push_with_duration(&mut self, path: impl Into<PathBuf>, duration: f64) {
        self.entries.push(ConcatEntry {
            path: path.into(),
            duration: Some(duration),
        });
    }

    pub fn entries(&self) -> &[ConcatEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the list as it will be written to `list_path`.
    ///
    /// The concat demuxer resolves relative entries against the list's own
    /// directory, so entries living next to the list are written by file
    /// name and everything else as given.
    pub fn render(&self, list_path: &Path) -> String {
        let list_dir = list_path.parent();
        let mut out = format!("{CONCAT_HEADER}\n\n");
        for entry in &self.entries {
            let shown = match (list_dir, entry.path.parent(), entry.path.file_name()) {
                (Some(dir), Some(parent), Some(name)) if dir == parent => Path::new(name),
                _ => entry.path.as_path(),
            };
            out.push_str(&format!("file {}\n", escape_concat_path(shown)));
            if let Some(duration) = entry.duration {
                out.push_str(&format!("duration {}\n", format_secs(duration)));
            }
        }
        out
    }

    pub fn to_artifact(&self, list_path: &Path) -> Artifact {
        Artifact {
            path: list_path.to_path_buf(),
            contents: self.render(list_path),
        }
    }
}
