//! Probe adapter.
//!
//! Turns external probe output into a [`StreamDescriptor`](crate::models::StreamDescriptor)
//! plus duration and subtitle count. The planner only talks to the
//! [`MediaProbe`] trait, so tests substitute an in-memory probe.

mod adapter;
mod ffprobe;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use adapter::report_from_json;
pub use ffprobe::FfprobeProbe;
pub use types::{MediaProbe, ProbeError, ProbeReport, ProbeResult};
