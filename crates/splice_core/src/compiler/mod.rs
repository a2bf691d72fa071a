//! Plan compilation entry point.
//!
//! ```text
//! JobRequest ─▶ probe main ─▶ negotiate ─▶ timeline
//!                                            ├─ ads?    ─▶ segment transcodes + concat list
//!                                            ├─ banner? ─▶ clip + gaps + banner track
//!                                            └─ final render (overlays, maps, metadata, codecs)
//! ```
//!
//! Compilation is synchronous and touches nothing on disk; the runner
//! writes artifacts and executes steps.

mod conversion;
mod errors;

pub use conversion::{ConversionPlan, PlanCompiler};
pub use errors::{PlanResult, PlanningError};
