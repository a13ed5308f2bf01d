//! Shared "fit pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load sample -> fit every requested specification -> per-year overlay rows
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use tracing::info;

use crate::data::{FredClient, generate_sample};
use crate::domain::{Sample, SourceKind, TrendConfig};
use crate::error::AppError;
use crate::fit::{TrendSelection, fit_all};
use crate::io::load_pwt_sample;
use crate::report::{TrendRow, trend_rows};

/// All computed outputs of a single `trend fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub sample: Sample,
    /// Non-fatal notes from loading (skipped CSV rows).
    pub ingest_notes: Vec<String>,
    pub selection: TrendSelection,
    pub rows: Vec<TrendRow>,
}

/// A loaded sample plus the loader's notes.
#[derive(Debug, Clone)]
pub struct LoadedSample {
    pub sample: Sample,
    pub notes: Vec<String>,
}

/// Load the GDP-per-capita series from the configured source.
pub fn load_sample(config: &TrendConfig) -> Result<LoadedSample, AppError> {
    let loaded = match config.source {
        SourceKind::Pwt => {
            let path = config
                .file
                .as_deref()
                .ok_or_else(|| AppError::new(2, "`--source pwt` requires `--file <CSV>`."))?;
            let data = load_pwt_sample(path, &config.country)?;
            let notes = data
                .row_errors
                .iter()
                .map(|e| format!("line {}: {}", e.line, e.message))
                .collect();
            LoadedSample {
                sample: data.sample,
                notes,
            }
        }
        SourceKind::Fred => {
            let series = config
                .series
                .as_deref()
                .ok_or_else(|| AppError::new(2, "`--source fred` requires `--series <ID>`."))?;
            let client = FredClient::from_env()?;
            LoadedSample {
                sample: client.fetch_sample(series)?,
                notes: Vec::new(),
            }
        }
        SourceKind::Synthetic => LoadedSample {
            sample: generate_sample(&config.synthetic)?,
            notes: Vec::new(),
        },
    };

    info!(
        entity = loaded.sample.entity(),
        n = loaded.sample.len(),
        first_year = loaded.sample.first_year(),
        last_year = loaded.sample.last_year(),
        "sample loaded"
    );
    Ok(loaded)
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_fit(config: &TrendConfig) -> Result<RunOutput, AppError> {
    let loaded = load_sample(config)?;
    let mut run = run_fit_with_sample(config, loaded.sample)?;
    run.ingest_notes = loaded.notes;
    Ok(run)
}

/// Execute the fitting part of the pipeline on an already loaded sample.
///
/// This is useful for the TUI where we want to refit without reloading.
/// Fails only when no specification could be fitted at all.
pub fn run_fit_with_sample(config: &TrendConfig, sample: Sample) -> Result<RunOutput, AppError> {
    let specs = config.spec.specs();
    let selection = fit_all(&sample, config.window, &specs);

    if selection.fits.is_empty() {
        return Err(match selection.skipped.into_iter().next() {
            Some((_, err)) => err.into(),
            None => AppError::new(2, "No trend specification selected."),
        });
    }

    let rows = trend_rows(&sample, &selection.fits)?;

    Ok(RunOutput {
        sample,
        ingest_notes: Vec::new(),
        selection,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::domain::{EstimationWindow, SpecSelector, SyntheticParams};

    fn config(source: SourceKind) -> TrendConfig {
        TrendConfig {
            source,
            file: None,
            country: "Belgium".to_string(),
            series: None,
            synthetic: SyntheticParams {
                first_year: 1950,
                last_year: 2019,
                start_value: 100.0,
                growth: 0.021,
                noise: 0.0,
                seed: 1,
            },
            window: EstimationWindow::new(1955, 2006).unwrap(),
            spec: SpecSelector::All,
            plot: false,
            plot_width: 80,
            plot_height: 10,
            export_fitted: None,
            export_trends: None,
            debug_bundle: false,
        }
    }

    #[test]
    fn synthetic_run_fits_all_specs() {
        let run = run_fit(&config(SourceKind::Synthetic)).unwrap();
        assert_eq!(run.selection.fits.len(), 4);
        assert_eq!(run.rows.len(), 65);
        assert_eq!(run.rows[0].year, 1955);
    }

    #[test]
    fn pwt_without_file_is_usage_error() {
        let err = run_fit(&config(SourceKind::Pwt)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn pwt_missing_file_is_usage_error() {
        let mut cfg = config(SourceKind::Pwt);
        cfg.file = Some(PathBuf::from("/nonexistent/pwt.csv"));
        let err = run_fit(&cfg).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn window_outside_sample_reports_no_data() {
        let mut cfg = config(SourceKind::Synthetic);
        cfg.window = EstimationWindow::new(2030, 2040).unwrap();
        let err = run_fit(&cfg).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
