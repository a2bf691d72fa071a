//! Pipeline step descriptors.
//!
//! A step is one ffmpeg invocation described as data: input clauses with
//! their prefix options, filters, stream maps, codec options, duration bound
//! and output path. `to_args()` is the only place it becomes an argv.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::filtergraph::{FilterChain, FilterGraph};

/// Format seconds the way every generated argument does.
pub fn format_secs(seconds: f64) -> String {
    format!("{:.6}", seconds)
}

/// What a step produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    AdSegment,
    MainSegment,
    BannerClip,
    BannerGap,
    BannerConcat,
    FinalRender,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepKind::AdSegment => "ad segment",
            StepKind::MainSegment => "main segment",
            StepKind::BannerClip => "banner clip",
            StepKind::BannerGap => "banner gap",
            StepKind::BannerConcat => "banner track",
            StepKind::FinalRender => "final render",
        };
        f.write_str(s)
    }
}

/// Option placed before an input's `-i`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InputOption {
    /// `-f <format>`
    Format(String),
    /// `-safe 0`, needed for concat lists with arbitrary paths.
    UnsafePaths,
    /// `-loop 1`, repeat a still image.
    Loop,
    /// `-stream_loop -1`, repeat a video input forever.
    StreamLoop,
    /// `-r <rate>`
    FrameRate(String),
    /// `-ss <seconds>`
    Seek(f64),
}

impl InputOption {
    fn push_args(&self, args: &mut Vec<String>) {
        match self {
            InputOption::Format(f) => args.extend(["-f".to_string(), f.clone()]),
            InputOption::UnsafePaths => args.extend(["-safe".to_string(), "0".to_string()]),
            InputOption::Loop => args.extend(["-loop".to_string(), "1".to_string()]),
            InputOption::StreamLoop => args.extend(["-stream_loop".to_string(), "-1".to_string()]),
            InputOption::FrameRate(r) => args.extend(["-r".to_string(), r.clone()]),
            InputOption::Seek(s) => args.extend(["-ss".to_string(), format_secs(*s)]),
        }
    }
}

/// One `-i` input with its prefix options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputClause {
    pub options: Vec<InputOption>,
    pub source: String,
}

impl InputClause {
    pub fn file(path: &Path) -> Self {
        Self {
            options: Vec::new(),
            source: path.to_string_lossy().into_owned(),
        }
    }

    /// A libavfilter source graph such as `anullsrc=r=48000:cl=stereo`.
    pub fn lavfi(graph: impl Into<String>) -> Self {
        Self {
            options: vec![InputOption::Format("lavfi".to_string())],
            source: graph.into(),
        }
    }

    /// A concat demuxer list file.
    pub fn concat_list(path: &Path) -> Self {
        Self {
            options: vec![InputOption::Format("concat".to_string()), InputOption::UnsafePaths],
            source: path.to_string_lossy().into_owned(),
        }
    }

    pub fn with(mut self, option: InputOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn has(&self, option: &InputOption) -> bool {
        self.options.contains(option)
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for option in &self.options {
            option.push_args(&mut args);
        }
        args.push("-i".to_string());
        args.push(self.source.clone());
        args
    }
}

/// Index of a step within its plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StepId(pub usize);

/// One external ffmpeg invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineStep {
    pub name: String,
    pub kind: StepKind,
    /// Options before the first input (e.g. `-hwaccel`).
    pub global_args: Vec<String>,
    pub inputs: Vec<InputClause>,
    pub filter_graph: Option<FilterGraph>,
    pub video_filters: Option<FilterChain>,
    pub audio_filters: Option<FilterChain>,
    /// Values passed to `-map`, in order.
    pub maps: Vec<String>,
    pub codec_args: Vec<String>,
    /// Output bound emitted as `-t`.
    pub duration: Option<f64>,
    pub output_args: Vec<String>,
    pub output: PathBuf,
    /// Steps whose outputs this step reads.
    pub depends_on: Vec<StepId>,
}

impl PipelineStep {
    pub fn new(name: impl Into<String>, kind: StepKind, output: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind,
            global_args: Vec::new(),
            inputs: Vec::new(),
            filter_graph: None,
            video_filters: None,
            audio_filters: None,
            maps: Vec::new(),
            codec_args: Vec::new(),
            duration: None,
            output_args: Vec::new(),
            output: output.into(),
            depends_on: Vec::new(),
        }
    }

    /// Full ffmpeg argument vector, program name excluded.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["-y".to_string()];
        args.extend(self.global_args.iter().cloned());
        for input in &self.inputs {
            args.extend(input.to_args());
        }
        if let Some(graph) = &self.filter_graph {
            args.push("-filter_complex".to_string());
            args.push(graph.to_string());
        }
        if let Some(vf) = &self.video_filters {
            args.push("-vf".to_string());
            args.push(vf.to_string());
        }
        if let Some(af) = &self.audio_filters {
            args.push("-af".to_string());
            args.push(af.to_string());
        }
        for map in &self.maps {
            args.push("-map".to_string());
            args.push(map.clone());
        }
        args.extend(self.codec_args.iter().cloned());
        if let Some(duration) = self.duration {
            args.push("-t".to_string());
            args.push(format_secs(duration));
        }
        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().into_owned());
        args
    }

    /// Shell-quoted command line for logs and dry runs.
    pub fn command_line(&self, program: &str) -> String {
        let mut words = vec![program.to_string()];
        words.extend(self.to_args());
        shell_words::join(words)
    }
}

/// Ordered steps of a plan; ids are positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepList {
    steps: Vec<PipelineStep>,
}

impl StepList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: PipelineStep) -> StepId {
        self.steps.push(step);
        StepId(self.steps.len() - 1)
    }

    pub fn get(&self, id: StepId) -> Option<&PipelineStep> {
        self.steps.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PipelineStep> {
        self.steps.iter()
    }

    pub fn into_vec(self) -> Vec<PipelineStep> {
        self.steps
    }
}

/// A file the runner writes before executing steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
}
