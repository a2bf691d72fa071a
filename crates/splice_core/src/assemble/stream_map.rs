//! Explicit source-to-output stream mapping, built as maps are emitted.

use std::fmt;

use serde::Serialize;

use crate::models::StreamKind;

/// A stream of one input, written `input:type:index` (e.g. `1:a:0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StreamRef {
    pub input: usize,
    pub kind: StreamKind,
    pub index: usize,
}

impl StreamRef {
    pub fn new(input: usize, kind: StreamKind, index: usize) -> Self {
        Self { input, kind, index }
    }

    /// Parse `input:type:index` or `type:index`; the short form uses
    /// `default_input`. A trailing `?` is ignored.
    pub fn parse(spec: &str, default_input: usize) -> Option<Self> {
        let spec = spec.trim().trim_end_matches('?');
        let parts: Vec<&str> = spec.split(':').collect();
        let (input, kind, index) = match parts.as_slice() {
            [input, kind, index] => (input.parse().ok()?, *kind, *index),
            [kind, index] => (default_input, *kind, *index),
            _ => return None,
        };
        Some(Self {
            input,
            kind: StreamKind::from_code(kind)?,
            index: index.parse().ok()?,
        })
    }

    /// Same stream read from another input.
    pub fn on_input(self, input: usize) -> Self {
        Self { input, ..self }
    }

    /// Optional map specifier (`0:v:0?`).
    pub fn optional_spec(&self) -> String {
        format!("{}?", self)
    }
}

impl fmt::Display for StreamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.input, self.kind.code(), self.index)
    }
}

/// An output stream addressed for `-metadata:` (`s:v:0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OutputStream {
    pub kind: StreamKind,
    pub index: usize,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s:{}:{}", self.kind.code(), self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamMapping {
    /// Input stream this output is read from, if any.
    pub origin: Option<StreamRef>,
    pub output: OutputStream,
}

/// Ordered list of output streams and their origins.
///
/// Output ordinals are assigned per type in the order maps are recorded,
/// matching how ffmpeg numbers output streams.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StreamIndexMap {
    mappings: Vec<StreamMapping>,
}

impl StreamIndexMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: StreamKind) -> usize {
        self.mappings.iter().filter(|m| m.output.kind == kind).count()
    }

    /// Record the next output stream of `kind`.
    pub fn record(&mut self, kind: StreamKind, origin: Option<StreamRef>) -> OutputStream {
        let output = OutputStream {
            kind,
            index: self.count(kind),
        };
        self.mappings.push(StreamMapping { origin, output });
        output
    }

    pub fn output_for(&self, origin: &StreamRef) -> Option<OutputStream> {
        self.mappings
            .iter()
            .find(|m| m.origin.as_ref() == Some(origin))
            .map(|m| m.output)
    }

    pub fn mappings(&self) -> &[StreamMapping] {
        &self.mappings
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}
