//! Per-segment exponential fitting.
//!
//! Responsibilities:
//!
//! - partition the altitude domain into fit tasks (`segmenter`)
//! - generate deterministic scale-candidate grids (`grid`)
//! - fit each segment by grid seed + damped refinement (`fitter`)
//! - assemble the ordered atmosphere model from the per-segment results

pub mod fitter;
pub mod grid;
pub mod segmenter;

pub use fitter::*;
pub use grid::*;
pub use segmenter::*;
