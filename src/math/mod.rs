//! Mathematical utilities: the dense least-squares solve behind the damped
//! refinement steps.

pub mod lsq;

pub use lsq::*;
