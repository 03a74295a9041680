//! Bounded nonlinear least squares for a single segment.
//!
//! Given a segment's `(altitude, density)` subset, its parameter box and its
//! prior, we fit the two-parameter law
//!
//! ```text
//! density(h) = offset/scale * exp(-h * K / scale) * U
//! ```
//!
//! in two stages:
//!
//! 1. deterministic seed: log-spaced `scale` candidates; for fixed scale the
//!    law is linear in `offset`, so the optimal offset is closed-form and is
//!    clamped into its box; the lowest-SSE candidate wins (ties by grid index)
//! 2. damped refinement (Levenberg-Marquardt with analytic Jacobian), each
//!    trial point projected into the parameter box before acceptance
//!
//! Refinement terminates on step norm or on a vanishing projected gradient;
//! exhausting the iteration budget is a fit divergence. The caller decides
//! whether to relax bounds and retry; there is no auto-retry here.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::error::AppError;
use crate::fit::grid::scale_candidates;
use crate::fit::segmenter::FitTask;
use crate::math::solve_least_squares;
use crate::models::{Atmosphere, DensityLaw, Layer};

/// Solver knobs shared by every segment fit.
#[derive(Debug, Clone, Copy)]
pub struct SolverOptions {
    /// Log-spaced scale candidates evaluated in the seed stage.
    pub scale_steps: usize,
    /// Refinement iteration cap; exceeding it is a `FitDivergence`.
    pub max_iterations: usize,
    /// Relative step norm below which refinement is considered converged.
    pub step_tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            scale_steps: 60,
            max_iterations: 200,
            step_tolerance: 1e-10,
        }
    }
}

/// Fitted parameters for one segment.
#[derive(Debug, Clone, Copy)]
pub struct LayerFit {
    pub lower: f64,
    pub upper_bound: f64,
    pub offset: f64,
    pub scale: f64,
    pub sse: f64,
    pub n: usize,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    idx: usize,
    offset: f64,
    scale: f64,
    sse: f64,
}

/// Fit all segments and assemble the ordered atmosphere model.
///
/// Segment fits are mutually independent, so they run in parallel; `collect`
/// preserves task order, which is exactly the boundary order the model's
/// ordering invariant needs. Any single failure aborts the whole build: a
/// model with a missing layer would be unusable.
pub fn fit_atmosphere(
    tasks: &[FitTask],
    law: DensityLaw,
    opts: &SolverOptions,
) -> Result<(Atmosphere, Vec<LayerFit>), AppError> {
    let fits: Vec<LayerFit> = tasks
        .par_iter()
        .map(|task| fit_segment(task, law, opts))
        .collect::<Result<_, _>>()?;

    let layers = fits
        .iter()
        .map(|f| Layer {
            upper_bound: f.upper_bound,
            offset: f.offset,
            scale: f.scale,
        })
        .collect();
    let model = Atmosphere::new(law, layers)?;

    Ok((model, fits))
}

/// Fit one segment by grid seed + damped refinement.
pub fn fit_segment(
    task: &FitTask,
    law: DensityLaw,
    opts: &SolverOptions,
) -> Result<LayerFit, AppError> {
    let range = format!("({}-{})", task.spec.lower, task.spec.upper);

    if task.samples.is_empty() {
        return Err(AppError::insufficient_data(format!(
            "Segment {range} has no samples to fit."
        )));
    }

    let altitudes: Vec<f64> = task.samples.iter().map(|s| s.altitude).collect();
    let densities: Vec<f64> = task.samples.iter().map(|s| s.density).collect();

    let seed = seed_candidate(task, law, opts, &altitudes, &densities)?.ok_or_else(|| {
        AppError::divergence(format!(
            "Segment {range}: no usable scale candidate within bounds."
        ))
    })?;

    refine(task, law, opts, &altitudes, &densities, seed, &range)
}

/// Stage 1: scan the scale grid, solving offset in closed form per candidate.
fn seed_candidate(
    task: &FitTask,
    law: DensityLaw,
    opts: &SolverOptions,
    altitudes: &[f64],
    densities: &[f64],
) -> Result<Option<Candidate>, AppError> {
    let candidates = scale_candidates(&task.spec.scale, opts.scale_steps)?;

    let mut best: Option<Candidate> = None;
    for (idx, &scale) in candidates.iter().enumerate() {
        // With scale fixed, density = offset * unit(h), so the least-squares
        // offset is <unit, d> / <unit, unit>, clamped into its box.
        let mut num = 0.0;
        let mut den = 0.0;
        for (&h, &d) in altitudes.iter().zip(densities) {
            let unit = law.density(h, 1.0, scale);
            num += unit * d;
            den += unit * unit;
        }
        if !(den.is_finite() && den > 0.0 && num.is_finite()) {
            continue;
        }

        let offset = task.spec.offset.bounds.clamp(num / den);
        let sse = sum_squared(law, altitudes, densities, offset, scale);
        if !sse.is_finite() {
            continue;
        }

        let better = match best {
            None => true,
            Some(b) => sse < b.sse || (sse == b.sse && idx < b.idx),
        };
        if better {
            best = Some(Candidate { idx, offset, scale, sse });
        }
    }

    Ok(best)
}

/// Stage 2: projected Levenberg-Marquardt refinement from the seed.
fn refine(
    task: &FitTask,
    law: DensityLaw,
    opts: &SolverOptions,
    altitudes: &[f64],
    densities: &[f64],
    seed: Candidate,
    range: &str,
) -> Result<LayerFit, AppError> {
    let offset_box = task.spec.offset.bounds;
    let scale_box = task.spec.scale.bounds;

    let mut offset = seed.offset;
    let mut scale = seed.scale;
    let mut sse = seed.sse;
    let mut lambda = 1e-3;
    let mut converged = false;

    for _ in 0..opts.max_iterations {
        let (jac, resid) = jacobian_residuals(law, altitudes, densities, offset, scale);

        if projected_gradient_is_flat(&jac, &resid, offset, scale, sse, offset_box, scale_box) {
            converged = true;
            break;
        }

        // Try increasingly damped steps until one does not worsen the fit.
        let mut accepted = None;
        let mut trial = lambda;
        for _ in 0..10 {
            if let Some((da, ds)) = damped_step(&jac, &resid, trial) {
                let cand_offset = offset_box.clamp(offset + da);
                let cand_scale = scale_box.clamp(scale + ds);
                let cand_sse = sum_squared(law, altitudes, densities, cand_offset, cand_scale);
                if cand_sse.is_finite() && cand_sse <= sse {
                    accepted = Some((cand_offset, cand_scale, cand_sse, trial));
                    break;
                }
            }
            trial *= 8.0;
        }

        let Some((new_offset, new_scale, new_sse, used)) = accepted else {
            return Err(AppError::divergence(format!(
                "Segment {range}: refinement stalled without reaching a bounded minimum."
            )));
        };

        let step_norm = ((new_offset - offset).abs() / offset.abs().max(1.0))
            .max((new_scale - scale).abs() / scale.abs().max(1.0));

        offset = new_offset;
        scale = new_scale;
        sse = new_sse;
        lambda = (used * 0.5).max(1e-12);

        if step_norm < opts.step_tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(AppError::divergence(format!(
            "Segment {range}: no convergence within {} refinement iterations.",
            opts.max_iterations
        )));
    }

    Ok(LayerFit {
        lower: task.spec.lower,
        upper_bound: task.spec.upper,
        offset,
        scale,
        sse,
        n: task.samples.len(),
    })
}

fn sum_squared(law: DensityLaw, altitudes: &[f64], densities: &[f64], offset: f64, scale: f64) -> f64 {
    altitudes
        .iter()
        .zip(densities)
        .map(|(&h, &d)| {
            let r = law.density(h, offset, scale) - d;
            r * r
        })
        .sum()
}

/// Analytic Jacobian of the law and the residual vector at `(offset, scale)`.
///
/// With `f = offset/scale * exp(-h*K/scale) * U`:
/// `df/d(offset) = f / offset` and `df/d(scale) = f * (h*K - scale) / scale^2`.
fn jacobian_residuals(
    law: DensityLaw,
    altitudes: &[f64],
    densities: &[f64],
    offset: f64,
    scale: f64,
) -> (DMatrix<f64>, DVector<f64>) {
    let n = altitudes.len();
    let mut jac = DMatrix::zeros(n, 2);
    let mut resid = DVector::zeros(n);

    for i in 0..n {
        let h = altitudes[i];
        let f = law.density(h, offset, scale);
        jac[(i, 0)] = f / offset;
        jac[(i, 1)] = f * (h * law.km_to_cm - scale) / (scale * scale);
        resid[i] = f - densities[i];
    }

    (jac, resid)
}

/// One Marquardt step: solve the damping-augmented least-squares system
/// `[J; sqrt(lambda * diag(J^T J))] delta = [-r; 0]`.
fn damped_step(jac: &DMatrix<f64>, resid: &DVector<f64>, lambda: f64) -> Option<(f64, f64)> {
    let n = jac.nrows();

    let mut h00 = 0.0;
    let mut h11 = 0.0;
    for i in 0..n {
        h00 += jac[(i, 0)] * jac[(i, 0)];
        h11 += jac[(i, 1)] * jac[(i, 1)];
    }

    let mut aug = DMatrix::zeros(n + 2, 2);
    let mut rhs = DVector::zeros(n + 2);
    for i in 0..n {
        aug[(i, 0)] = jac[(i, 0)];
        aug[(i, 1)] = jac[(i, 1)];
        rhs[i] = -resid[i];
    }
    aug[(n, 0)] = if h00 > 0.0 { (lambda * h00).sqrt() } else { lambda.sqrt() };
    aug[(n + 1, 1)] = if h11 > 0.0 { (lambda * h11).sqrt() } else { lambda.sqrt() };

    let step = solve_least_squares(&aug, &rhs)?;
    Some((step[0], step[1]))
}

/// Stationarity test honoring the parameter box: gradient components whose
/// descent direction points out of an active bound cannot be followed and are
/// ignored.
fn projected_gradient_is_flat(
    jac: &DMatrix<f64>,
    resid: &DVector<f64>,
    offset: f64,
    scale: f64,
    sse: f64,
    offset_box: crate::domain::ParamBounds,
    scale_box: crate::domain::ParamBounds,
) -> bool {
    let n = jac.nrows();
    let mut g0 = 0.0;
    let mut g1 = 0.0;
    for i in 0..n {
        g0 += jac[(i, 0)] * resid[i];
        g1 += jac[(i, 1)] * resid[i];
    }

    // Descent direction is -g; a component blocked by an active bound is dropped.
    if (offset >= offset_box.hi && g0 < 0.0) || (offset <= offset_box.lo && g0 > 0.0) {
        g0 = 0.0;
    }
    if (scale >= scale_box.hi && g1 < 0.0) || (scale <= scale_box.lo && g1 > 0.0) {
        g1 = 0.0;
    }

    g0.abs() * offset.abs().max(1.0) + g1.abs() * scale.abs().max(1.0) <= 1e-10 * (1.0 + sse)
}
