//! Model quality scoring against measured samples.
//!
//! The headline figure of merit is a relative chi-square over an altitude
//! band: the mean of `(fitted/measured - 1)^2` over every sample whose
//! altitude falls inside the band, both ends inclusive. A band that captures
//! no samples is an `EmptyRange` error rather than a silent zero, so a typo'd
//! band cannot masquerade as a perfect fit.

pub mod format;

use crate::domain::Sample;
use crate::error::AppError;
use crate::models::Atmosphere;

/// Chi-square score for one altitude band.
#[derive(Debug, Clone, Copy)]
pub struct BandScore {
    pub lower: f64,
    pub upper: f64,
    pub n: usize,
    pub chi_square: f64,
    pub ratio_min: f64,
    pub ratio_max: f64,
}

/// Per-sample evaluation of a model.
#[derive(Debug, Clone, Copy)]
pub struct SampleScore {
    pub sample: Sample,
    pub fitted: f64,
    pub ratio: f64,
}

/// Mean squared relative deviation of `model` from the samples in
/// `[lower, upper]`, both ends inclusive.
pub fn chi_square(
    model: &Atmosphere,
    samples: &[Sample],
    lower: f64,
    upper: f64,
) -> Result<f64, AppError> {
    let score = score_band(model, samples, lower, upper)?;
    Ok(score.chi_square)
}

/// Full band score: chi-square plus the ratio envelope and sample count.
pub fn score_band(
    model: &Atmosphere,
    samples: &[Sample],
    lower: f64,
    upper: f64,
) -> Result<BandScore, AppError> {
    let mut n = 0usize;
    let mut sum = 0.0;
    let mut ratio_min = f64::INFINITY;
    let mut ratio_max = f64::NEG_INFINITY;

    for s in samples {
        if s.altitude < lower || s.altitude > upper {
            continue;
        }
        let ratio = model.density(s.altitude) / s.density;
        let dev = ratio - 1.0;
        sum += dev * dev;
        ratio_min = ratio_min.min(ratio);
        ratio_max = ratio_max.max(ratio);
        n += 1;
    }

    if n == 0 {
        return Err(AppError::empty_range(format!(
            "No samples with altitude in [{lower}, {upper}]."
        )));
    }

    Ok(BandScore {
        lower,
        upper,
        n,
        chi_square: sum / n as f64,
        ratio_min,
        ratio_max,
    })
}

/// Score every band in turn, failing fast on the first empty one.
pub fn score_bands(
    model: &Atmosphere,
    samples: &[Sample],
    bands: &[(f64, f64)],
) -> Result<Vec<BandScore>, AppError> {
    bands
        .iter()
        .map(|&(lower, upper)| score_band(model, samples, lower, upper))
        .collect()
}

/// Evaluate the model at every sample altitude.
pub fn evaluate_samples(model: &Atmosphere, samples: &[Sample]) -> Vec<SampleScore> {
    samples
        .iter()
        .map(|&sample| {
            let fitted = model.density(sample.altitude);
            SampleScore {
                sample,
                fitted,
                ratio: fitted / sample.density,
            }
        })
        .collect()
}
