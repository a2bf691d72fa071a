//! Filter structures and the overlay filtergraph compiler.
//!
//! Filters are built as tagged values ([`Filter`], [`FilterChain`],
//! [`GraphClause`], [`FilterGraph`]) and only turned into ffmpeg syntax when
//! a step is serialized, so tests can inspect individual clauses.
//!
//! # Example
//!
//! ```
//! use splice_core::filtergraph::{Filter, FilterChain};
//!
//! let chain = FilterChain::new()
//!     .with(Filter::new("fps").arg("25"))
//!     .with(Filter::new("format").opt("pix_fmts", "yuv420p"));
//! assert_eq!(chain.to_string(), "fps=25,format=pix_fmts=yuv420p");
//! ```

mod compiler;
mod motion;
mod node;

pub use compiler::{
    compile_overlays, enable_expression, BannerOverlay, CompiledGraph, LogoOverlay,
    OverlayRequest, BANNER_OUTPUT, CANVAS_LABEL, LOGO_OUTPUT,
};
pub use motion::{MotionPath, BLUR_SCALE, MIN_ANIMATED_CYCLE};
pub use node::{Filter, FilterArg, FilterChain, FilterGraph, GraphClause};
