//! Piecewise exponential atmosphere models.
//!
//! The density law and the layered model are implemented as small, pure
//! functions/types so the fitting and reporting code can stay generic.

pub mod model;
pub mod reference;

pub use model::*;
pub use reference::*;
