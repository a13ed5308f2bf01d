//! Read/write trend JSON files.
//!
//! Trend JSON is the "portable" representation of a run:
//! - entity + estimation window
//! - observed levels from the window start onwards
//! - every successful fit (coefficients, fitted log trend, diagnostics)
//!
//! The schema is defined by `domain::TrendFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{EstimationWindow, Sample, TrendFile, TrendFit};
use crate::error::AppError;

pub fn build_trend_file(sample: &Sample, window: EstimationWindow, fits: &[TrendFit]) -> TrendFile {
    let start = fits
        .first()
        .and_then(|f| f.years.first().copied())
        .unwrap_or(window.year_min);
    TrendFile {
        tool: "trend".to_string(),
        entity: sample.entity().to_string(),
        window,
        observed: sample.since(start).to_vec(),
        fits: fits.to_vec(),
    }
}

/// Write a trend JSON file.
pub fn write_trend_json(path: &Path, trends: &TrendFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create trend JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, trends)
        .map_err(|e| AppError::new(2, format!("Failed to write trend JSON: {e}")))?;

    Ok(())
}

/// Read a trend JSON file.
pub fn read_trend_json(path: &Path) -> Result<TrendFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open trend JSON '{}': {e}", path.display())))?;
    let trends: TrendFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid trend JSON: {e}")))?;
    validate_trend_file(&trends)?;
    Ok(trends)
}

/// Shape checks serde cannot express: every fit covers the same non-empty
/// run of years, with one fitted value per year.
fn validate_trend_file(trends: &TrendFile) -> Result<(), AppError> {
    let invalid = |msg: String| AppError::new(2, format!("Invalid trend JSON: {msg}"));
    let Some(first) = trends.fits.first() else {
        return Ok(());
    };

    for fit in &trends.fits {
        let name = &fit.display_name;
        if fit.years.is_empty() {
            return Err(invalid(format!("fit '{name}' covers no years")));
        }
        if fit.years.len() != fit.fitted_log.len() {
            return Err(invalid(format!(
                "fit '{name}' has {} years but {} fitted values",
                fit.years.len(),
                fit.fitted_log.len()
            )));
        }
        if fit.years.windows(2).any(|w| w[1] != w[0] + 1) {
            return Err(invalid(format!("fit '{name}' years are not consecutive")));
        }
        if fit.quality.n == 0 || fit.quality.n > fit.years.len() {
            return Err(invalid(format!(
                "fit '{name}' has T={} for {} years",
                fit.quality.n,
                fit.years.len()
            )));
        }
        if fit.years != first.years {
            return Err(invalid(format!("fit '{name}' covers different years")));
        }
    }
    Ok(())
}
