//! Parameter negotiation and timeline planning.
//!
//! # Architecture
//!
//! ```text
//! main StreamDescriptor ──negotiate()──▶ TargetParams
//! JobRequest + probe    ──TimelinePlanner──▶ TimelinePlan
//!                                              ├─ ads (sorted, stable)
//!                                              ├─ TimelineMap (original → adjusted)
//!                                              ├─ final_duration
//!                                              └─ banner windows
//! ```

mod negotiate;
mod timecode;
mod timeline;

pub use negotiate::{negotiate, FALLBACK_PIX_FMT, FALLBACK_TIMESCALE};
pub use timecode::{format_timecode, parse_timecode};
pub use timeline::{
    banner_windows, AdInsertion, BannerPlan, BannerWindow, TimelineMap, TimelinePlan,
    TimelinePlanner, TIME_EPSILON,
};
