//! Reporting utilities: per-year overlay rows and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

pub mod format;

pub use format::*;

use crate::domain::{Sample, TrendFit};
use crate::error::AppError;
use crate::fit::checked_ln;

/// One year of the actual-vs-fitted overlay, all in natural-log units.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendRow {
    pub year: i32,
    pub log_observed: f64,
    /// Fitted value per fit, aligned with the `fits` slice passed in.
    pub fitted: Vec<f64>,
    /// `log_observed - fitted`, aligned with `fitted`.
    pub residuals: Vec<f64>,
}

/// Build the overlay rows for all fits.
///
/// All fits of one run share the same horizon, so the years are taken from
/// the first fit; an empty `fits` slice yields no rows.
pub fn trend_rows(sample: &Sample, fits: &[TrendFit]) -> Result<Vec<TrendRow>, AppError> {
    let Some(first) = fits.first() else {
        return Ok(Vec::new());
    };
    if fits.iter().any(|f| f.years != first.years) {
        return Err(AppError::new(4, "Trend fits cover different horizons."));
    }

    let mut rows = Vec::with_capacity(first.years.len());
    for (i, &year) in first.years.iter().enumerate() {
        let obs = sample
            .get(year)
            .ok_or_else(|| AppError::new(4, format!("No observation for year {year}.")))?;
        let log_observed = checked_ln(year, obs.value)?;
        let fitted: Vec<f64> = fits.iter().map(|f| f.fitted_log[i]).collect();
        let residuals = fitted.iter().map(|y| log_observed - y).collect();
        rows.push(TrendRow {
            year,
            log_observed,
            fitted,
            residuals,
        });
    }
    Ok(rows)
}
