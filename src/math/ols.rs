//! Least-squares helpers used to seed MCMC chains.
//!
//! Chains start near the ordinary least-squares solution rather than at an
//! arbitrary point; the tune phase then only has to adapt step sizes, not
//! walk across the whole prior. The solver mirrors the usual small-problem
//! trade-off:
//!
//! - We solve via SVD so tall (rows > columns) systems work robustly.
//! - Parameter dimension is tiny (2 columns), so SVD cost is irrelevant.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if the strict solve fails;
    // near-collinear designs (e.g., constant explanatory values) fall out
    // as `None` rather than NaN coefficients.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y = a + b x` by least squares, returning `(a, b)`.
pub fn fit_line(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len();
    let mut design = DMatrix::<f64>::zeros(n, 2);
    for (i, &xi) in x.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = xi;
    }
    let obs = DVector::from_row_slice(y);

    let beta = solve_least_squares(&design, &obs)?;
    Some((beta[0], beta[1]))
}
