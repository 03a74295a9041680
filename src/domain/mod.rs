//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the reference sample point (`Sample`)
//! - per-segment parameter boxes and priors (`ParamSpec`, `SegmentSpec`)
//! - the run configuration (`FitConfig`) and its defaults

pub mod types;

pub use types::*;
