//! Pipeline steps and the builders that emit them.
//!
//! Everything here is data: a step knows its inputs, filters, maps and
//! output path but never runs. Intermediate paths come from a
//! [`TempAllocator`] up front, so later steps can name earlier outputs
//! before anything exists on disk.

mod banner;
mod concat;
mod segments;
mod step;
mod temp;

pub use banner::{banner_height, build_banner_track, BannerTrack, BANNER_EXT};
pub use concat::{escape_concat_path, ConcatEntry, ConcatList, CONCAT_HEADER};
pub use segments::{
    build_segment_plan, segment_audio_chain, segment_step, segment_video_chain, SegmentPlan,
    SegmentSource, SEGMENT_EXT,
};
pub use step::{
    format_secs, Artifact, InputClause, InputOption, PipelineStep, StepId, StepKind, StepList,
};
pub use temp::TempAllocator;
