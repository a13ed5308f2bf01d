//! Export the actual-vs-fitted overlay to CSV.
//!
//! One row per year of the horizon; all values in natural-log units, so the
//! file can be plotted directly in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::TrendFit;
use crate::error::AppError;
use crate::report::TrendRow;

/// Write the overlay rows to a CSV file.
pub fn write_fitted_csv(path: &Path, rows: &[TrendRow], fits: &[TrendFit]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_fitted(file, rows, fits)
}

/// Write the overlay rows as CSV to any writer.
pub fn write_fitted<W: Write>(mut out: W, rows: &[TrendRow], fits: &[TrendFit]) -> Result<(), AppError> {
    let mut header = String::from("year,in_sample,log_observed");
    for fit in fits {
        header.push(',');
        header.push_str(fit.spec.column_name());
    }
    writeln!(out, "{header}")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let last_in_sample = fits.first().map(|f| f.years[0] + f.quality.n as i32 - 1);
    for row in rows {
        let in_sample = last_in_sample.is_some_and(|y| row.year <= y);
        let mut line = format!("{},{},{:.10}", row.year, u8::from(in_sample), row.log_observed);
        for v in &row.fitted {
            line.push_str(&format!(",{v:.10}"));
        }
        writeln!(out, "{line}")
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}
