//! Data models shared across the compiler.
//!
//! - Stream kinds used in ffmpeg specifiers
//! - Probe descriptors and negotiated target parameters
//! - Job requests (ads, banner, logo, track edits)

mod enums;
mod jobs;
mod media;

pub use enums::StreamKind;
pub use jobs::{AdRequest, BannerRequest, JobRequest, LogoRequest, TrackEdit};
pub use media::{AudioTarget, Rational, StreamDescriptor, TargetParams};
