//! Debug bundle writer for inspecting the regression internals of a run.
//!
//! For every requested specification the bundle shows the design matrix `X`,
//! the Gram matrix `X'X`, its explicit inverse, `X'y` and the coefficients,
//! so a fit can be checked by hand.

use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use nalgebra::DMatrix;

use crate::domain::{EstimationWindow, Sample, TrendSpec};
use crate::error::AppError;
use crate::fit::{response_vector, Horizon};
use crate::math::solve_normal_equations;
use crate::models::design_columns;

/// Write a bundle under `./debug/` and return its path.
pub fn write_debug_bundle(
    sample: &Sample,
    window: EstimationWindow,
    specs: &[TrendSpec],
) -> Result<PathBuf, AppError> {
    write_debug_bundle_in(Path::new("debug"), sample, window, specs)
}

/// Same as [`write_debug_bundle`] with an explicit output directory.
pub fn write_debug_bundle_in(
    dir: &Path,
    sample: &Sample,
    window: EstimationWindow,
    specs: &[TrendSpec],
) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let entity: String = sample
        .entity()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let path = dir.join(format!(
        "trend_debug_{entity}_{}_{}_{ts}.md",
        window.year_min, window.year_max
    ));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(4, format!("Failed to create debug file: {e}")))?;
    write_bundle(&mut file, sample, window, specs)?;

    Ok(path)
}

fn write_bundle<W: Write>(
    out: &mut W,
    sample: &Sample,
    window: EstimationWindow,
    specs: &[TrendSpec],
) -> Result<(), AppError> {
    let horizon = Horizon::resolve(sample, window)?;

    let mut md = String::new();
    md.push_str("# trend debug bundle\n");
    md.push_str(&format!("- generated: {}\n", Local::now().to_rfc3339()));
    md.push_str(&format!("- entity: {}\n", sample.entity()));
    md.push_str(&format!(
        "- window: {}..={} (effective {}..={})\n",
        window.year_min, window.year_max, horizon.start, horizon.end
    ));
    md.push_str(&format!(
        "- T={} | T_all={}\n",
        horizon.periods, horizon.periods_all
    ));

    md.push_str("\n## Observations\n");
    md.push_str("| t | year | level | ln(level) | in_sample |\n");
    md.push_str("| - | - | - | - | - |\n");
    for t in 1..=horizon.periods_all {
        let year = horizon.year_of(t);
        let level = sample.get(year).map(|o| o.value).unwrap_or(f64::NAN);
        let log = if level > 0.0 { level.ln() } else { f64::NAN };
        md.push_str(&format!(
            "| {t} | {year} | {level:.4} | {log:.6} | {} |\n",
            t <= horizon.periods
        ));
    }

    for &spec in specs {
        md.push_str(&format!("\n## {}\n", spec.display_name()));

        let response = match response_vector(spec, horizon.estimation(sample)) {
            Ok(r) => r,
            Err(err) => {
                md.push_str(&format!("- skipped: {err}\n"));
                continue;
            }
        };
        let regressors = design_columns(spec, horizon.periods);
        let system = match solve_normal_equations(&response, &regressors) {
            Ok(s) => s,
            Err(err) => {
                md.push_str(&format!("- skipped: {err}\n"));
                continue;
            }
        };

        md.push_str(&format!("- rcond: {:.3e}\n", system.rcond));
        md.push_str("\n### X\n");
        md.push_str(&fmt_matrix(&system.design));
        md.push_str("\n### X'X\n");
        md.push_str(&fmt_matrix(&system.gram));
        md.push_str("\n### (X'X)^-1\n");
        md.push_str(&fmt_matrix(&system.gram_inv));
        md.push_str("\n### X'y\n");
        md.push_str(&fmt_vec(system.xty.as_slice()));
        md.push_str("\n\n### coefficients\n");
        md.push_str(&fmt_vec(system.coefs.as_slice()));
        md.push('\n');
    }

    out.write_all(md.as_bytes())
        .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))
}

fn fmt_matrix(m: &DMatrix<f64>) -> String {
    let mut out = String::new();
    out.push('|');
    for k in 0..m.ncols() {
        out.push_str(&format!(" c{k} |"));
    }
    out.push_str("\n|");
    out.push_str(&" - |".repeat(m.ncols()));
    out.push('\n');
    for row in m.row_iter() {
        out.push('|');
        for v in row.iter() {
            out.push_str(&format!(" {v:.6e} |"));
        }
        out.push('\n');
    }
    out
}

fn fmt_vec(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.6e}")).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_lists_matrices_per_spec() {
        let sample = Sample::from_pairs("Test Land", (2000..=2006).map(|y| (y, 100.0 + (y - 2000) as f64))).unwrap();
        let window = EstimationWindow::new(2000, 2004).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let path = write_debug_bundle_in(
            dir.path(),
            &sample,
            window,
            &[TrendSpec::AdditiveLinear, TrendSpec::ExponentialQuadratic],
        )
        .unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("trend_debug_Test_Land_2000_2004_"));

        let txt = std::fs::read_to_string(&path).unwrap();
        assert!(txt.contains("- T=5 | T_all=7"));
        assert!(txt.contains("## Additive, linear"));
        assert!(txt.contains("## Exponential, quadratic"));
        assert_eq!(txt.matches("### (X'X)^-1").count(), 2);
        // Gram entry (0,0) is T.
        assert!(txt.contains("| 5.000000e0 |"));
    }

    #[test]
    fn failing_spec_is_reported_not_fatal() {
        let sample = Sample::from_pairs("X", [(2000, 1.0), (2001, 2.0)]).unwrap();
        let window = EstimationWindow::new(2000, 2001).unwrap();
        let mut buf = Vec::new();
        write_bundle(&mut buf, &sample, window, &[TrendSpec::AdditiveQuadratic]).unwrap();
        let txt = String::from_utf8(buf).unwrap();
        assert!(txt.contains("- skipped:"));
    }
}
