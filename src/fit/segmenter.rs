//! Altitude-domain segmentation.
//!
//! Turns the configured boundary list into independent fit tasks, each
//! carrying its own parameter box/prior and the samples within its range.

use crate::domain::{FitConfig, Sample, SegmentSpec};
use crate::error::AppError;

/// One independent fit task: a segment spec plus its sample subset.
#[derive(Debug, Clone)]
pub struct FitTask {
    /// Position within the boundary order (assembly key).
    pub index: usize,
    pub spec: SegmentSpec,
    pub samples: Vec<Sample>,
}

/// Partition the samples into per-segment fit tasks.
///
/// Filtering is inclusive on both ends, so a sample sitting exactly on an
/// interior boundary participates in both adjoining fits. The reference
/// scripts do the same and the fit is tolerant of the duplication; it is a
/// documented choice, not an accident.
///
/// Empty subsets are not rejected here; the fitter reports them per segment
/// so the failure message can name the range that lacked data.
pub fn build_tasks(samples: &[Sample], config: &FitConfig) -> Result<Vec<FitTask>, AppError> {
    let specs = config.segment_specs()?;

    let tasks = specs
        .into_iter()
        .enumerate()
        .map(|(index, spec)| FitTask {
            index,
            spec,
            samples: samples
                .iter()
                .copied()
                .filter(|s| s.altitude >= spec.lower && s.altitude <= spec.upper)
                .collect(),
        })
        .collect();

    Ok(tasks)
}
