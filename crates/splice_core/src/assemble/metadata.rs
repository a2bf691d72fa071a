//! Global metadata copy and per-track title/language edits.

use std::collections::BTreeMap;

use crate::logging::Diagnostics;
use crate::models::TrackEdit;

use super::stream_map::{StreamIndexMap, StreamRef};

/// Languages are accepted only as three ASCII letters (ISO 639-2 shape).
pub fn is_valid_language(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

/// Resolve a user edit key to a stream of the metadata-source input.
///
/// Input 0 always means the user's main file, which is a different input
/// once the primary input is a concat list.
fn resolve_key(key: &str, metadata_input: usize) -> Option<StreamRef> {
    let stream = StreamRef::parse(key, metadata_input)?;
    if stream.input == 0 {
        Some(stream.on_input(metadata_input))
    } else {
        Some(stream)
    }
}

/// `-map_metadata`, `-movflags +use_metadata_tags`, then one `-metadata:s:*`
/// pair per accepted edit. Unmappable keys and bad languages are skipped
/// with a warning.
pub fn metadata_args(
    edits: &BTreeMap<String, TrackEdit>,
    streams: &StreamIndexMap,
    metadata_input: usize,
    diag: &mut Diagnostics,
) -> Vec<String> {
    let mut args = vec![
        "-map_metadata".to_string(),
        metadata_input.to_string(),
        "-movflags".to_string(),
        "+use_metadata_tags".to_string(),
    ];

    for (key, edit) in edits {
        if edit.is_empty() {
            continue;
        }
        let Some(source) = resolve_key(key, metadata_input) else {
            diag.warn(format!("Ignoring metadata edit with invalid track id '{}'", key));
            continue;
        };
        let Some(output) = streams.output_for(&source) else {
            diag.warn(format!(
                "Could not map original track {} to an output stream for metadata edits",
                key
            ));
            continue;
        };

        if let Some(title) = edit.title.as_deref().filter(|t| !t.is_empty()) {
            args.push(format!("-metadata:{}", output));
            args.push(format!("title={}", title));
        }
        if let Some(language) = edit.language.as_deref().filter(|l| !l.is_empty()) {
            if is_valid_language(language) {
                args.push(format!("-metadata:{}", output));
                args.push(format!("language={}", language.to_ascii_lowercase()));
            } else {
                diag.warn(format!(
                    "Invalid language code '{}' for {}, skipping",
                    language, output
                ));
            }
        }
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StreamKind;

    fn streams(metadata_input: usize) -> StreamIndexMap {
        let mut map = StreamIndexMap::new();
        map.record(
            StreamKind::Video,
            Some(StreamRef::new(metadata_input, StreamKind::Video, 0)),
        );
        map.record(
            StreamKind::Audio,
            Some(StreamRef::new(metadata_input, StreamKind::Audio, 0)),
        );
        map.record(
            StreamKind::Subtitle,
            Some(StreamRef::new(metadata_input, StreamKind::Subtitle, 0)),
        );
        map
    }

    #[test]
    fn validates_language_shape() {
        assert!(is_valid_language("eng"));
        assert!(is_valid_language("FRE"));
        assert!(!is_valid_language("en"));
        assert!(!is_valid_language("e1g"));
        assert!(!is_valid_language("engl"));
    }

    #[test]
    fn edits_translate_to_output_specifiers() {
        let mut edits = BTreeMap::new();
        edits.insert(
            "a:0".to_string(),
            TrackEdit::default().with_title("Commentary").with_language("ENG"),
        );
        edits.insert("0:s:0".to_string(), TrackEdit::default().with_language("fre"));
        let mut diag = Diagnostics::new();

        let args = metadata_args(&edits, &streams(0), 0, &mut diag);
        assert_eq!(
            args,
            vec![
                "-map_metadata", "0", "-movflags", "+use_metadata_tags",
                "-metadata:s:s:0", "language=fre",
                "-metadata:s:a:0", "title=Commentary",
                "-metadata:s:a:0", "language=eng",
            ]
        );
        assert!(!diag.has_warnings());
    }

    #[test]
    fn concat_mode_reads_edits_from_the_original() {
        let mut edits = BTreeMap::new();
        edits.insert("0:v:0".to_string(), TrackEdit::default().with_title("Main"));
        edits.insert("1:a:0".to_string(), TrackEdit::default().with_title("Stereo"));
        let mut diag = Diagnostics::new();

        let args = metadata_args(&edits, &streams(1), 1, &mut diag);
        assert_eq!(&args[..2], &["-map_metadata", "1"]);
        assert!(args.windows(2).any(|w| w == ["-metadata:s:v:0", "title=Main"]));
        assert!(args.windows(2).any(|w| w == ["-metadata:s:a:0", "title=Stereo"]));
    }

    #[test]
    fn unmapped_and_invalid_edits_warn() {
        let mut edits = BTreeMap::new();
        edits.insert("a:3".to_string(), TrackEdit::default().with_title("Gone"));
        edits.insert("bogus".to_string(), TrackEdit::default().with_title("?"));
        edits.insert("v:0".to_string(), TrackEdit::default().with_language("english"));
        let mut diag = Diagnostics::new();

        let args = metadata_args(&edits, &streams(0), 0, &mut diag);
        assert_eq!(args.len(), 4);
        assert_eq!(diag.warnings().count(), 3);
    }
}
