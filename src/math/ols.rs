//! Ordinary least squares.
//!
//! Every estimator in the battery is a small linear regression of the form
//!
//! ```text
//! minimize Σ (y_i - β0 - Σ_j β_j x_ij)^2
//! ```
//!
//! with at most four columns, solved thousands of times per run.
//!
//! Implementation choices:
//! - We solve via SVD so a tall design matrix (many more rows than columns)
//!   is handled directly. (Nalgebra's `QR::solve` is intended for square
//!   systems and will panic for non-square matrices.)
//! - Rank-deficient designs (e.g. a constant regressor) are reported as
//!   `None` rather than returning an arbitrary minimum-norm solution.

use nalgebra::{DMatrix, DVector};

/// Singular values below this fraction of the largest one mark the design as
/// rank deficient.
const RANK_TOL: f64 = 1e-10;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    let s_max = svd.singular_values.max();
    if !(s_max.is_finite() && s_max > 0.0) {
        return None;
    }
    if svd.singular_values.iter().any(|&s| s <= s_max * RANK_TOL) {
        return None;
    }

    let beta = svd.solve(y, s_max * RANK_TOL).ok()?;
    if beta.iter().all(|v| v.is_finite()) {
        Some(beta)
    } else {
        None
    }
}

/// Fitted linear model `y = β0 + Σ β_j x_j`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    /// `[β0, β1, ..., βk]`, intercept first, then regressors in input order.
    pub coefficients: Vec<f64>,
}

impl LinearFit {
    pub fn intercept(&self) -> f64 {
        self.coefficients[0]
    }

    /// Coefficient of the `j`-th regressor (0-based, excluding the intercept).
    pub fn slope(&self, j: usize) -> f64 {
        self.coefficients[j + 1]
    }

    pub fn predict(&self, x: &[f64]) -> f64 {
        self.intercept() + x.iter().enumerate().map(|(j, v)| self.slope(j) * v).sum::<f64>()
    }
}

/// Fit `y` on `regressors` with an intercept.
///
/// All slices must have the same length. Returns `None` when there are not
/// more rows than coefficients or the design is rank deficient.
pub fn fit_linear(y: &[f64], regressors: &[&[f64]]) -> Option<LinearFit> {
    let n = y.len();
    let p = regressors.len() + 1;
    if n <= p || regressors.iter().any(|r| r.len() != n) {
        return None;
    }

    let x = DMatrix::<f64>::from_fn(n, p, |i, j| if j == 0 { 1.0 } else { regressors[j - 1][i] });
    let y = DVector::<f64>::from_column_slice(y);

    let beta = solve_least_squares(&x, &y)?;
    Some(LinearFit {
        coefficients: beta.iter().copied().collect(),
    })
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
    fn fit_linear_recovers_two_slopes() {
        let x1 = [0.0, 1.0, 0.0, 1.0, 0.0, 1.0];
        let x2 = [1.0, 2.0, 3.0, 4.0, 5.0, 7.0];
        let y: Vec<f64> = x1.iter().zip(&x2).map(|(a, b)| 1.5 - 2.0 * a + 0.5 * b).collect();

        let fit = fit_linear(&y, &[&x1[..], &x2[..]]).unwrap();
        assert!((fit.intercept() - 1.5).abs() < 1e-9);
        assert!((fit.slope(0) + 2.0).abs() < 1e-9);
        assert!((fit.slope(1) - 0.5).abs() < 1e-9);
        assert!((fit.predict(&[1.0, 2.0]) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn constant_regressor_is_rank_deficient() {
        let x = [1.0; 5];
        let y = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(fit_linear(&y, &[&x[..]]).is_none());
    }

    #[test]
    fn too_few_rows_is_rejected() {
        let x = [0.0, 1.0];
        let y = [1.0, 2.0];
        assert!(fit_linear(&y, &[&x[..]]).is_none());
    }
}
