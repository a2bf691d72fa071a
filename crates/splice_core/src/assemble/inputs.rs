//! Ordered inputs of the final render.

use std::path::Path;

use crate::models::TargetParams;
use crate::plan::{InputClause, InputOption};

/// The moving logo and whether it is a still image.
#[derive(Debug, Clone, Copy)]
pub struct LogoInput<'a> {
    pub path: &'a Path,
    pub is_still: bool,
}

/// Input clauses plus the index of each role.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalInputs {
    pub clauses: Vec<InputClause>,
    /// Input carrying the base video and audio.
    pub primary: usize,
    /// Input whose metadata and subtitles are copied.
    pub metadata_source: usize,
    pub banner: Option<usize>,
    pub logo: Option<usize>,
}

impl FinalInputs {
    fn push(&mut self, clause: InputClause) -> usize {
        self.clauses.push(clause);
        self.clauses.len() - 1
    }
}

/// Declare inputs in order: primary (main file or concat list), the
/// original file again in concat mode when `needs_original`, the banner
/// track, the logo.
///
/// Without the original, the concat list is the metadata source.
pub fn declare_inputs(
    main: &Path,
    concat_list: Option<&Path>,
    needs_original: bool,
    banner_track: Option<&Path>,
    logo: Option<LogoInput<'_>>,
    target: &TargetParams,
) -> FinalInputs {
    let mut inputs = FinalInputs {
        clauses: Vec::new(),
        primary: 0,
        metadata_source: 0,
        banner: None,
        logo: None,
    };

    match concat_list {
        Some(list) => {
            inputs.primary = inputs.push(InputClause::concat_list(list));
            inputs.metadata_source = if needs_original {
                inputs.push(InputClause::file(main))
            } else {
                inputs.primary
            };
        }
        None => {
            inputs.primary = inputs.push(InputClause::file(main));
            inputs.metadata_source = inputs.primary;
        }
    }

    if let Some(track) = banner_track {
        inputs.banner = Some(inputs.push(InputClause::file(track)));
    }

    if let Some(logo) = logo {
        let clause = if logo.is_still {
            InputClause::file(logo.path)
                .with(InputOption::Loop)
                .with(InputOption::FrameRate(target.fps.to_string()))
        } else {
            InputClause::file(logo.path).with(InputOption::StreamLoop)
        };
        inputs.logo = Some(inputs.push(clause));
    }

    inputs
}
