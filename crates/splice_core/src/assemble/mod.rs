//! Final command assembly and stream-index remapping.
//!
//! The final render reads the primary input (main file or concat list),
//! the original file as metadata source in concat mode, the banner track
//! and the logo. Maps are recorded in a [`StreamIndexMap`] as they are
//! emitted, which is what per-track metadata edits are resolved against.

mod assembler;
mod encoding;
mod finalize;
mod inputs;
mod metadata;
mod stream_map;

pub use assembler::{assemble_final, BannerInput, FinalRender, FinalRenderRequest};
pub use encoding::{final_codec_args, hwaccel_args, segment_codec_args, split_params};
pub use finalize::{finalize_step, has_duration_bound, merge_movflags, movflags_value, needs_faststart};
pub use inputs::{declare_inputs, FinalInputs, LogoInput};
pub use metadata::{is_valid_language, metadata_args};
pub use stream_map::{OutputStream, StreamIndexMap, StreamMapping, StreamRef};
