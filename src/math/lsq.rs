//! Dense least-squares solver.
//!
//! The refinement stage repeatedly solves small problems of the form:
//!
//! ```text
//! minimize ||J δ - r||^2
//! ```
//!
//! where `J` is the (possibly damping-augmented) Jacobian of the density law
//! and `r` the residual vector. The parameter dimension is 2, but `J` is tall,
//! so we solve via SVD rather than QR (nalgebra's `QR::solve` targets square
//! systems). At this size SVD cost is negligible.

use nalgebra::{DMatrix, DVector};

/// Solve a least-squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
/// Near-singular Jacobians do occur when a segment's samples barely constrain
/// the scale parameter, so we try progressively looser tolerances before
/// giving up.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-12, 1e-9, 1e-6] {
        if let Ok(step) = svd.solve(y, tol) {
            if step.iter().all(|v| v.is_finite()) {
                return Some(step);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn tall_overdetermined_system_returns_lsq_solution() {
        // y = 1 + x with one inconsistent row; the solution minimizes the SSE.
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0, 4.5]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!(beta.iter().all(|v| v.is_finite()));
        // Residual must be orthogonal to the column span.
        let r = &y - &x * &beta;
        let g = x.transpose() * r;
        assert!(g.iter().all(|v| v.abs() < 1e-9));
    }
}
