//! Synthetic sample table generation.

pub mod sample;

pub use sample::*;
