//! Ordinary least squares via the normal equations.
//!
//! Given a response `y` (length `T`) and `N` regressor columns of the same
//! length, we solve
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! by forming the Gram matrix `G = X'X`, inverting it explicitly, and taking
//! `β = G^{-1} X'y`. The debug bundle prints exactly these matrices, so the
//! solve must stay an explicit inverse (no QR/SVD).
//!
//! Near-singular Gram matrices are detected with a reciprocal condition
//! estimate and reported as `TrendError::SingularMatrix` rather than returning
//! huge or NaN coefficients.

use nalgebra::{DMatrix, DVector};

use crate::error::TrendError;

/// Smallest accepted reciprocal 1-norm condition estimate of `X'X`.
pub const MIN_RCOND: f64 = 1e-14;

/// All intermediate pieces of one normal-equations solve.
#[derive(Debug, Clone)]
pub struct GramSystem {
    /// `T x N` design matrix, regressor `k` in column `k`.
    pub design: DMatrix<f64>,
    /// `X'X`.
    pub gram: DMatrix<f64>,
    /// `(X'X)^{-1}`.
    pub gram_inv: DMatrix<f64>,
    /// `X'y`.
    pub xty: DVector<f64>,
    /// `(X'X)^{-1} X'y`, aligned with the regressor order.
    pub coefs: DVector<f64>,
    /// Reciprocal condition estimate `1 / (‖G‖₁ ‖G⁻¹‖₁)`.
    pub rcond: f64,
}

/// Assemble the design matrix from positional regressor columns.
pub fn design_matrix(rows: usize, regressors: &[Vec<f64>]) -> Result<DMatrix<f64>, TrendError> {
    if regressors.is_empty() {
        return Err(TrendError::NoRegressors);
    }
    for (column, x) in regressors.iter().enumerate() {
        if x.len() != rows {
            return Err(TrendError::DimensionMismatch {
                expected: rows,
                got: x.len(),
                column,
            });
        }
    }
    Ok(DMatrix::from_fn(rows, regressors.len(), |i, k| regressors[k][i]))
}

/// Solve the normal equations and keep every intermediate matrix.
pub fn solve_normal_equations(
    response: &[f64],
    regressors: &[Vec<f64>],
) -> Result<GramSystem, TrendError> {
    let design = design_matrix(response.len(), regressors)?;
    let (t, n) = design.shape();
    if t < n {
        return Err(TrendError::singular(format!(
            "{n} regressors but only {t} observations"
        )));
    }

    let y = DVector::from_column_slice(response);
    let xt = design.transpose();
    let gram = &xt * &design;
    let xty = &xt * &y;

    let gram_inv = gram
        .clone()
        .try_inverse()
        .ok_or_else(|| TrendError::singular("matrix inversion failed"))?;
    if !gram_inv.iter().all(|v| v.is_finite()) {
        return Err(TrendError::singular("inverse has non-finite entries"));
    }

    let rcond = 1.0 / (norm_1(&gram) * norm_1(&gram_inv));
    // `!(a >= b)` also rejects NaN.
    if !(rcond >= MIN_RCOND) {
        return Err(TrendError::singular(format!(
            "reciprocal condition estimate {rcond:.3e} is below {MIN_RCOND:.0e}"
        )));
    }

    let coefs = &gram_inv * &xty;
    if !coefs.iter().all(|v| v.is_finite()) {
        return Err(TrendError::singular("coefficients are non-finite"));
    }

    Ok(GramSystem {
        design,
        gram,
        gram_inv,
        xty,
        coefs,
        rcond,
    })
}

/// OLS coefficients of `response` on the ordered `regressors`.
///
/// The returned vector has one entry per regressor, in the same order. Put a
/// column of ones first to make the first coefficient the intercept.
pub fn regression_coefs(response: &[f64], regressors: &[Vec<f64>]) -> Result<Vec<f64>, TrendError> {
    let system = solve_normal_equations(response, regressors)?;
    Ok(system.coefs.iter().copied().collect())
}

/// Maximum absolute column sum.
fn norm_1(m: &DMatrix<f64>) -> f64 {
    m.column_iter()
        .map(|c| c.iter().map(|v| v.abs()).sum::<f64>())
        .fold(0.0, f64::max)
}
