//! Formatted terminal output: run summary, coefficients, overlay table.

use crate::domain::{DatasetStats, EstimationWindow, TrendFit, TrendSpec};
use crate::fit::TrendSelection;
use crate::report::TrendRow;

/// Format the full run summary (dataset stats + coefficients + diagnostics).
pub fn format_run_summary(
    entity: &str,
    stats: &DatasetStats,
    window: EstimationWindow,
    selection: &TrendSelection,
) -> String {
    let mut out = String::new();

    out.push_str("=== trend - GDP per capita trend fits ===\n");
    out.push_str(&format!("Entity: {entity}\n"));
    out.push_str(&format!(
        "Data: n={} | years=[{}, {}] | level=[{:.2}, {:.2}]\n",
        stats.n_points, stats.year_first, stats.year_last, stats.value_min, stats.value_max
    ));
    out.push_str(&format!(
        "Estimation window: {}..={}\n",
        window.year_min, window.year_max
    ));
    if let Some(fit) = selection.fits.first() {
        out.push_str(&format!(
            "Periods: T={} | T_all={} | t=1 is {}\n",
            fit.quality.n,
            fit.years.len(),
            fit.years[0]
        ));
    }

    out.push_str("\nCoefficients (t = 1, 2, ...):\n");
    for fit in &selection.fits {
        out.push_str(&format!(
            "  {:<24} {}\n",
            fit.display_name,
            fmt_coefs(fit)
        ));
    }

    out.push_str("\nFit diagnostics (log units):\n");
    let best = selection.best().map(|f| f.spec);
    for fit in &selection.fits {
        let chosen = if Some(fit.spec) == best { "*" } else { " " };
        let oos = match fit.quality.oos_rmse {
            Some(v) => format!("{v:.5} (n={})", fit.quality.oos_n),
            None => "-".to_string(),
        };
        out.push_str(&format!(
            "{chosen} {:<24} SSE={:.6} RMSE={:.5} out-of-sample RMSE={oos}\n",
            fit.display_name, fit.quality.sse, fit.quality.rmse,
        ));
    }
    for (spec, reason) in &selection.skipped {
        out.push_str(&format!("  (skipped {}) {reason}\n", spec.display_name()));
    }
    out.push('\n');

    out
}

/// Format the per-year overlay table (log observed vs fitted).
pub fn format_trend_table(rows: &[TrendRow], fits: &[TrendFit]) -> String {
    let mut out = String::new();

    let mut header = format!("{:>6} {:>10}", "year", "log_obs");
    let mut rule = format!("{:-<6} {:-<10}", "", "");
    for fit in fits {
        header.push_str(&format!(" {:>10}", fit.spec.column_name()));
        rule.push_str(&format!(" {:-<10}", ""));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(rule.trim_end());
    out.push('\n');

    let last_in_sample = fits.first().map(|f| f.years[0] + f.quality.n as i32 - 1);
    for row in rows {
        let mut line = format!("{:>6} {:>10.4}", row.year, row.log_observed);
        for v in &row.fitted {
            line.push_str(&format!(" {v:>10.4}"));
        }
        if last_in_sample.is_some_and(|y| row.year > y) {
            line.push_str("  (extrapolated)");
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

fn fmt_coefs(fit: &TrendFit) -> String {
    let names: &[&str] = match fit.spec {
        TrendSpec::AdditiveLinear | TrendSpec::ExponentialLinear => &["a", "b"],
        TrendSpec::AdditiveQuadratic | TrendSpec::ExponentialQuadratic => &["a", "b1", "b2"],
    };
    let parts: Vec<String> = names
        .iter()
        .zip(&fit.coefs)
        .map(|(name, v)| format!("{name}={v:.6e}"))
        .collect();
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Sample, TrendSpec};
    use crate::fit::fit_all;
    use crate::report::trend_rows;

    #[test]
    fn summary_lists_fits_and_skips() {
        let sample = Sample::from_pairs("X", [(2000, 100.0), (2001, 110.0), (2002, 120.0)]).unwrap();
        let window = EstimationWindow::new(2000, 2001).unwrap();
        let selection = fit_all(&sample, window, &TrendSpec::ALL);

        let txt = format_run_summary(sample.entity(), &sample.stats(), window, &selection);
        assert!(txt.contains("Entity: X"));
        assert!(txt.contains("T=2 | T_all=3 | t=1 is 2000"));
        assert!(txt.contains("Additive, linear"));
        assert!(txt.contains("(skipped Additive, quadratic)"));
        assert!(txt.contains("(skipped Exponential, quadratic)"));
    }

    #[test]
    fn table_marks_extrapolated_years() {
        let sample = Sample::from_pairs("X", [(2000, 100.0), (2001, 110.0), (2002, 120.0)]).unwrap();
        let window = EstimationWindow::new(2000, 2001).unwrap();
        let selection = fit_all(&sample, window, &[TrendSpec::ExponentialLinear]);
        let rows = trend_rows(&sample, &selection.fits).unwrap();

        let txt = format_trend_table(&rows, &selection.fits);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[0], "  year    log_obs    exp_lin");
        assert_eq!(lines.len(), 5);
        assert!(!lines[3].contains("extrapolated"));
        assert!(lines[4].starts_with("  2002"));
        assert!(lines[4].ends_with("(extrapolated)"));
    }
}
