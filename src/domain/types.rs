//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can
//! be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for comparisons against other models

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::DensityLaw;

/// One reference observation: altitude in km, density in table units.
///
/// Samples are collected into an ordered sequence by the ingest layer, but
/// ordering is not required for correctness; all altitude filtering is by
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub altitude: f64,
    pub density: f64,
}

/// Closed parameter interval `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamBounds {
    pub lo: f64,
    pub hi: f64,
}

impl ParamBounds {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lo, self.hi)
    }

    pub fn is_valid(&self) -> bool {
        self.lo.is_finite() && self.hi.is_finite() && self.lo > 0.0 && self.hi > self.lo
    }
}

/// Bounds plus initial guess for one free parameter of the density law.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub bounds: ParamBounds,
    pub guess: f64,
}

impl ParamSpec {
    pub fn new(lo: f64, hi: f64, guess: f64) -> Self {
        Self {
            bounds: ParamBounds::new(lo, hi),
            guess,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.bounds.is_valid()
            && self.guess.is_finite()
            && self.guess >= self.bounds.lo
            && self.guess <= self.bounds.hi
    }
}

/// Fully resolved configuration for one segment.
///
/// Each segment carries its own parameter box and prior. The top segment gets
/// an explicit override rather than a positional special case: the
/// top-of-atmosphere layer is sparse and must admit near-vacuum densities, so
/// its offset box reaches much lower than the interior default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSpec {
    pub lower: f64,
    pub upper: f64,
    pub offset: ParamSpec,
    pub scale: ParamSpec,
}

/// Segment boundaries (km) used by the CORSIKA 8 atmosphere fit scripts.
pub const DEFAULT_BOUNDARIES: [f64; 17] = [
    -1.0, 3.0, 7.0, 11.0, 16.0, 22.0, 28.0, 35.0, 40.0, 45.0, 50.0, 61.0, 70.0, 80.0, 90.0, 100.0,
    112.0,
];

/// Interior-segment offset box and prior.
pub const DEFAULT_OFFSET: ParamSpec = ParamSpec {
    bounds: ParamBounds { lo: 100.0, hi: 1700.0 },
    guess: 700.0,
};

/// Offset box for the last segment (near-vacuum densities allowed).
pub const TOP_SEGMENT_OFFSET: ParamSpec = ParamSpec {
    bounds: ParamBounds { lo: 1.0, hi: 1700.0 },
    guess: 700.0,
};

/// Scale box and prior shared by all segments.
pub const DEFAULT_SCALE: ParamSpec = ParamSpec {
    bounds: ParamBounds { lo: 1.0e5, hi: 1.5e6 },
    guess: 7.0e5,
};

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub table_path: PathBuf,

    /// Strictly increasing segment boundaries (km). The last value also
    /// serves as the model's upper extent.
    pub boundaries: Vec<f64>,

    /// Parameter box and prior for interior segments.
    pub offset: ParamSpec,
    /// Parameter box and prior override for the final segment.
    pub top_offset: ParamSpec,
    pub scale: ParamSpec,

    /// Unit conversion constants of the density law.
    pub law: DensityLaw,

    /// Log-spaced scale candidates evaluated before refinement.
    pub scale_steps: usize,
    /// Refinement iteration cap; exceeding it is a fit divergence.
    pub max_iterations: usize,

    pub export_results: Option<PathBuf>,
    pub export_model: Option<PathBuf>,
}

impl FitConfig {
    /// Resolve per-segment specs from the boundary list and the configured
    /// parameter boxes. Fails on a malformed boundary list or parameter box.
    pub fn segment_specs(&self) -> Result<Vec<SegmentSpec>, crate::error::AppError> {
        use crate::error::AppError;

        if self.boundaries.len() < 2 {
            return Err(AppError::config(format!(
                "Boundary list needs at least 2 entries, got {}.",
                self.boundaries.len()
            )));
        }
        if self.boundaries.iter().any(|b| !b.is_finite()) {
            return Err(AppError::config("Boundary list contains a non-finite value."));
        }
        for pair in self.boundaries.windows(2) {
            if pair[1] <= pair[0] {
                return Err(AppError::config(format!(
                    "Boundary list must be strictly increasing: {} then {}.",
                    pair[0], pair[1]
                )));
            }
        }
        if !self.offset.is_valid() || !self.top_offset.is_valid() || !self.scale.is_valid() {
            return Err(AppError::config(
                "Parameter box must be finite with 0 < lo < hi and guess inside the box.",
            ));
        }

        let last = self.boundaries.len() - 2;
        let specs = self
            .boundaries
            .windows(2)
            .enumerate()
            .map(|(i, pair)| SegmentSpec {
                lower: pair[0],
                upper: pair[1],
                offset: if i == last { self.top_offset } else { self.offset },
                scale: self.scale,
            })
            .collect();
        Ok(specs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn base_config(boundaries: Vec<f64>) -> FitConfig {
        FitConfig {
            table_path: PathBuf::from("atmo.csv"),
            boundaries,
            offset: DEFAULT_OFFSET,
            top_offset: TOP_SEGMENT_OFFSET,
            scale: DEFAULT_SCALE,
            law: DensityLaw::default(),
            scale_steps: 60,
            max_iterations: 200,
            export_results: None,
            export_model: None,
        }
    }

    #[test]
    fn segment_specs_apply_top_override_to_last_segment_only() {
        let config = base_config(vec![-1.0, 3.0, 7.0, 110.0]);
        let specs = config.segment_specs().unwrap();

        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0].offset, DEFAULT_OFFSET);
        assert_eq!(specs[1].offset, DEFAULT_OFFSET);
        assert_eq!(specs[2].offset, TOP_SEGMENT_OFFSET);
        assert_eq!(specs[2].lower, 7.0);
        assert_eq!(specs[2].upper, 110.0);
    }

    #[test]
    fn segment_specs_reject_short_boundary_list() {
        let err = base_config(vec![0.0]).segment_specs().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn segment_specs_reject_non_increasing_boundaries() {
        let err = base_config(vec![-1.0, 5.0, 5.0, 10.0]).segment_specs().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
