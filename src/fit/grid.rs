//! Scale-candidate grid generation.
//!
//! The density law is linear in `offset` once `scale` is fixed, so the fitter
//! seeds its refinement with a deterministic grid search over `scale`.
//!
//! Why grid search for the seed?
//! - It avoids local-minimum traps from a cold nonlinear start.
//! - It is deterministic given the same inputs/flags.
//! - Scale spans an order of magnitude, so log spacing covers it evenly.

use crate::domain::ParamSpec;
use crate::error::AppError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(AppError::config(format!(
            "Invalid grid range: min={min}, max={max} (must be finite, >0, and max>min)."
        )));
    }
    if steps < 2 {
        return Err(AppError::config("Grid steps must be >= 2."));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

/// Scale candidates for one segment: the log grid over the parameter box plus
/// the configured prior (so a well-chosen guess is always evaluated exactly).
pub fn scale_candidates(spec: &ParamSpec, steps: usize) -> Result<Vec<f64>, AppError> {
    let mut out = log_space(spec.bounds.lo, spec.bounds.hi, steps)?;
    if !out.iter().any(|&s| (s - spec.guess).abs() < f64::EPSILON * spec.guess) {
        out.push(spec.guess);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(1.0e5, 1.5e6, 5).unwrap();
        assert!((v[0] - 1.0e5).abs() < 1e-6);
        assert!((v[v.len() - 1] - 1.5e6).abs() < 1e-6);
    }

    #[test]
    fn log_space_rejects_degenerate_ranges() {
        assert_eq!(log_space(1.0, 1.0, 5).unwrap_err().kind(), ErrorKind::Configuration);
        assert_eq!(log_space(-1.0, 1.0, 5).unwrap_err().kind(), ErrorKind::Configuration);
        assert_eq!(log_space(1.0, 2.0, 1).unwrap_err().kind(), ErrorKind::Configuration);
    }

    #[test]
    fn scale_candidates_contain_the_prior() {
        let spec = ParamSpec::new(1.0e5, 1.5e6, 7.0e5);
        let candidates = scale_candidates(&spec, 10).unwrap();
        assert!(candidates.iter().any(|&s| (s - 7.0e5).abs() < 1e-6));
    }
}
