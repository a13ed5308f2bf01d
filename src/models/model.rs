//! Polynomial time-trend evaluation for the four trend specifications.
//!
//! The builder relies on two primitive operations:
//! - build a design row for a given period `t` (for OLS)
//! - predict the trend at `t` given the coefficients (for fitted values/plots)
//!
//! Periods are 1-based: the first year of the estimation window is `t = 1`.
//! Predictions are in the regression's own units (levels for additive
//! specifications, natural logs for exponential ones).

use crate::domain::{PolyDegree, TrendSpec};

/// Fill a design row for the given specification.
///
/// The row includes the constant term first (intercept).
///
/// # Panics
/// Panics if `out` is shorter than `spec.coef_len()`. Callers should size it correctly.
pub fn fill_design_row(spec: TrendSpec, t: f64, out: &mut [f64]) {
    match spec.degree() {
        PolyDegree::Linear => {
            out[0] = 1.0;
            out[1] = t;
        }
        PolyDegree::Quadratic => {
            out[0] = 1.0;
            out[1] = t;
            out[2] = t * t;
        }
    }
}

/// Regressor columns `[ones, t, (t^2)]` for `t = 1..=periods`.
pub fn design_columns(spec: TrendSpec, periods: usize) -> Vec<Vec<f64>> {
    let k = spec.coef_len();
    let mut columns = vec![Vec::with_capacity(periods); k];
    let mut row = vec![0.0; k];
    for t in 1..=periods {
        fill_design_row(spec, t as f64, &mut row);
        for (column, &value) in columns.iter_mut().zip(&row) {
            column.push(value);
        }
    }
    columns
}

/// Predict the trend at period `t`.
pub fn predict(spec: TrendSpec, t: f64, coefs: &[f64]) -> f64 {
    match spec.degree() {
        PolyDegree::Linear => coefs[0] + coefs[1] * t,
        PolyDegree::Quadratic => coefs[0] + coefs[1] * t + coefs[2] * t * t,
    }
}
