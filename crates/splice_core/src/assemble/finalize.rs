//! Last touches on the final render: duration bound and `-movflags` merge.

use std::collections::BTreeSet;
use std::path::Path;

use crate::plan::PipelineStep;

const FASTSTART: &str = "faststart";

/// Containers that get `+faststart`.
pub fn needs_faststart(output: &Path) -> bool {
    output
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "mp4" | "m4v" | "mov"))
        .unwrap_or(false)
}

/// Whether the args already bound the output length.
pub fn has_duration_bound(args: &[String]) -> bool {
    args.iter().any(|a| a == "-t" || a == "-to")
}

/// Remove every `-movflags` (with its value, when one follows) and collect
/// the value's tokens.
fn take_movflags(args: &mut Vec<String>, tokens: &mut BTreeSet<String>) -> bool {
    let mut found = false;
    let mut kept = Vec::with_capacity(args.len());
    let mut iter = std::mem::take(args).into_iter().peekable();
    while let Some(arg) = iter.next() {
        if arg != "-movflags" {
            kept.push(arg);
            continue;
        }
        found = true;
        if let Some(value) = iter.next_if(|next| !next.starts_with('-')) {
            tokens.extend(
                value
                    .split('+')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string),
            );
        }
    }
    *args = kept;
    found
}

/// Render a token set as a single flag value, `+a+b`.
pub fn movflags_value(tokens: &BTreeSet<String>) -> String {
    let joined: Vec<&str> = tokens.iter().map(String::as_str).collect();
    format!("+{}", joined.join("+"))
}

/// Merge all `-movflags` occurrences plus `extra` into one set union,
/// emitted once at the end of `output_args`.
pub fn merge_movflags(step: &mut PipelineStep, extra: &str) {
    let mut tokens = BTreeSet::new();
    take_movflags(&mut step.codec_args, &mut tokens);
    take_movflags(&mut step.output_args, &mut tokens);
    tokens.insert(extra.to_string());
    step.output_args.push("-movflags".to_string());
    step.output_args.push(movflags_value(&tokens));
}

/// Bound the output at `final_duration` unless the user args already do,
/// and add fast-start for MP4-family outputs.
pub fn finalize_step(step: &mut PipelineStep, final_duration: f64) {
    let bounded = has_duration_bound(&step.codec_args) || has_duration_bound(&step.output_args);
    if !bounded && final_duration > 0.0 {
        step.duration = Some(final_duration);
    }
    if needs_faststart(&step.output) {
        merge_movflags(step, FASTSTART);
    }
}
