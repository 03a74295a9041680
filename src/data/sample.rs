//! Generating density tables from a known model.
//!
//! Useful for exercising the fitter against ground truth: sample a reference
//! model on an altitude grid, optionally perturbed by seeded Gaussian
//! relative noise, and write the result as a CSV table the ingest side can
//! read back.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::domain::Sample;
use crate::error::AppError;
use crate::models::Atmosphere;

/// Altitude grid and noise settings for a synthetic table.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticSpec {
    pub alt_min: f64,
    pub alt_max: f64,
    pub step: f64,
    /// Relative standard deviation of the multiplicative noise; 0 disables it.
    pub noise: f64,
    pub seed: u64,
}

impl SyntheticSpec {
    fn validate(&self) -> Result<(), AppError> {
        if !(self.alt_min.is_finite() && self.alt_max.is_finite() && self.alt_min < self.alt_max) {
            return Err(AppError::config(format!(
                "Altitude range [{}, {}] is not a valid interval.",
                self.alt_min, self.alt_max
            )));
        }
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(AppError::config(format!(
                "Grid step {} must be positive and finite.",
                self.step
            )));
        }
        if !(self.noise.is_finite() && self.noise >= 0.0) {
            return Err(AppError::config(format!(
                "Noise level {} must be non-negative and finite.",
                self.noise
            )));
        }
        Ok(())
    }
}

/// Sample `model` on the grid described by `spec`.
pub fn synthesize(model: &Atmosphere, spec: &SyntheticSpec) -> Result<Vec<Sample>, AppError> {
    spec.validate()?;

    let dist = if spec.noise > 0.0 {
        Some(
            Normal::new(0.0, spec.noise)
                .map_err(|err| AppError::config(format!("Noise level {}: {err}", spec.noise)))?,
        )
    } else {
        None
    };
    let mut rng = StdRng::seed_from_u64(spec.seed);

    let steps = ((spec.alt_max - spec.alt_min) / spec.step).floor() as usize;
    let mut samples = Vec::with_capacity(steps + 1);
    for i in 0..=steps {
        let altitude = spec.alt_min + i as f64 * spec.step;
        let mut density = model.density(altitude);
        if let Some(dist) = &dist {
            // Multiplicative factor floored so the density stays positive.
            let factor = (1.0 + dist.sample(&mut rng)).max(1e-12);
            density *= factor;
        }
        samples.push(Sample { altitude, density });
    }

    Ok(samples)
}

/// Write samples as an `altitude,density` CSV table.
pub fn write_table<W: Write>(writer: W, samples: &[Sample]) -> Result<(), AppError> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record(["altitude", "density"])
        .map_err(|err| AppError::io(format!("Cannot write table header: {err}")))?;
    for s in samples {
        csv.write_record([s.altitude.to_string(), s.density.to_string()])
            .map_err(|err| AppError::io(format!("Cannot write table row: {err}")))?;
    }
    csv.flush()
        .map_err(|err| AppError::io(format!("Cannot flush table: {err}")))
}

/// Write samples to a CSV file at `path`.
pub fn export_table(path: &Path, samples: &[Sample]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|err| AppError::io(format!("Cannot create {}: {err}", path.display())))?;
    write_table(file, samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::reference::us_std;

    fn spec(noise: f64, seed: u64) -> SyntheticSpec {
        SyntheticSpec { alt_min: -1.0, alt_max: 4.0, step: 0.5, noise, seed }
    }

    #[test]
    fn noiseless_table_reproduces_the_model_exactly() {
        let model = us_std();
        let samples = synthesize(&model, &spec(0.0, 0)).unwrap();

        assert_eq!(samples.len(), 11);
        for s in &samples {
            assert_eq!(s.density.to_bits(), model.density(s.altitude).to_bits());
        }
    }

    #[test]
    fn same_seed_gives_the_same_noisy_table() {
        let model = us_std();
        let a = synthesize(&model, &spec(0.01, 42)).unwrap();
        let b = synthesize(&model, &spec(0.01, 42)).unwrap();
        let c = synthesize(&model, &spec(0.01, 43)).unwrap();

        assert_eq!(a.len(), b.len());
        assert!(a.iter().zip(&b).all(|(x, y)| x.density == y.density));
        assert!(a.iter().zip(&c).any(|(x, y)| x.density != y.density));
    }

    #[test]
    fn noisy_densities_stay_positive() {
        let model = us_std();
        let samples = synthesize(&model, &spec(0.5, 7)).unwrap();
        assert!(samples.iter().all(|s| s.density > 0.0));
    }

    #[test]
    fn degenerate_grid_is_a_configuration_error() {
        let model = us_std();
        let bad = SyntheticSpec { alt_min: 4.0, alt_max: -1.0, step: 0.5, noise: 0.0, seed: 0 };
        let err = synthesize(&model, &bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
