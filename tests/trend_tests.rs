//! End-to-end tests of the regression solver and trend builder.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use gdp_trend::data::generate_sample;
use gdp_trend::domain::{EstimationWindow, Sample, SyntheticParams, TrendSpec};
use gdp_trend::error::TrendError;
use gdp_trend::fit::{build_trend, fit_all};
use gdp_trend::io::{build_trend_file, read_trend_json, write_fitted_csv, write_trend_json};
use gdp_trend::math::regression_coefs;
use gdp_trend::report::trend_rows;

fn ones(t: usize) -> Vec<f64> {
    vec![1.0; t]
}

fn time_index(t: usize) -> Vec<f64> {
    (1..=t).map(|i| i as f64).collect()
}

fn growth_path(first_year: i32, last_year: i32, growth: f64) -> Sample {
    generate_sample(&SyntheticParams {
        first_year,
        last_year,
        start_value: 100.0,
        growth,
        noise: 0.0,
        seed: 7,
    })
    .expect("synthetic sample")
}

// ============================================================================
// RegressionSolver
// ============================================================================

#[test]
fn test_constant_regressor_recovers_mean() {
    let y = [3.0, 5.0, 7.0, 9.0];
    let coefs = regression_coefs(&y, &[ones(4)]).expect("fit should succeed");
    assert_eq!(coefs.len(), 1);
    assert_relative_eq!(coefs[0], 6.0, epsilon = 1e-12);
}

#[test]
fn test_exact_linear_recovery() {
    // y = 2 + 3t
    let t = time_index(8);
    let y: Vec<f64> = t.iter().map(|t| 2.0 + 3.0 * t).collect();
    let coefs = regression_coefs(&y, &[ones(8), t]).expect("fit should succeed");
    assert_relative_eq!(coefs[0], 2.0, epsilon = 1e-9);
    assert_relative_eq!(coefs[1], 3.0, epsilon = 1e-10);
}

#[test]
fn test_exact_quadratic_recovery() {
    // y = 2 + 0.5t + 0.1t^2
    let t = time_index(10);
    let t2: Vec<f64> = t.iter().map(|t| t * t).collect();
    let y: Vec<f64> = t.iter().map(|t| 2.0 + 0.5 * t + 0.1 * t * t).collect();
    let coefs = regression_coefs(&y, &[ones(10), t, t2]).expect("fit should succeed");
    assert_abs_diff_eq!(coefs[0], 2.0, epsilon = 1e-8);
    assert_abs_diff_eq!(coefs[1], 0.5, epsilon = 1e-8);
    assert_abs_diff_eq!(coefs[2], 0.1, epsilon = 1e-9);
}

#[test]
fn test_refitting_fitted_values_reproduces_coefficients() {
    let t = time_index(12);
    let y = [1.0, 2.5, 2.0, 4.0, 3.5, 6.0, 5.0, 7.5, 8.0, 7.0, 9.5, 10.0];
    let regressors = vec![ones(12), t.clone()];
    let coefs = regression_coefs(&y, &regressors).expect("fit should succeed");

    let fitted: Vec<f64> = t.iter().map(|t| coefs[0] + coefs[1] * t).collect();
    let refit = regression_coefs(&fitted, &regressors).expect("refit should succeed");
    assert_relative_eq!(refit[0], coefs[0], epsilon = 1e-9);
    assert_relative_eq!(refit[1], coefs[1], epsilon = 1e-9);
}

#[test]
fn test_repeated_calls_are_bitwise_identical() {
    let t = time_index(15);
    let t2: Vec<f64> = t.iter().map(|t| t * t).collect();
    let y: Vec<f64> = t.iter().map(|t| (4.6 + 0.02 * t + 0.013 * (t * 1.7).sin()).exp()).collect();
    let regressors = vec![ones(15), t, t2];

    let a = regression_coefs(&y, &regressors).expect("first call");
    let b = regression_coefs(&y, &regressors).expect("second call");
    assert_eq!(a, b);
    assert!(a.iter().zip(&b).all(|(x, y)| x.to_bits() == y.to_bits()));
}

#[test]
fn test_dimension_mismatch() {
    let err = regression_coefs(&[1.0, 2.0, 3.0], &[ones(3), vec![1.0, 2.0]]).unwrap_err();
    assert_eq!(
        err,
        TrendError::DimensionMismatch {
            expected: 3,
            got: 2,
            column: 1
        }
    );
}

#[test]
fn test_collinear_regressors_are_singular() {
    let err = regression_coefs(&[1.0, 2.0, 3.0, 4.0], &[ones(4), vec![2.0; 4]]).unwrap_err();
    assert!(matches!(err, TrendError::SingularMatrix { .. }), "got {err:?}");
}

// ============================================================================
// TrendBuilder
// ============================================================================

#[test]
fn test_exponential_series_prefers_exponential_linear() {
    // 2.1% growth, estimated on 1955..2006 like the Belgian default.
    let sample = growth_path(1950, 2019, 0.021);
    let window = EstimationWindow::new(1955, 2006).unwrap();
    let selection = fit_all(&sample, window, &TrendSpec::ALL);
    assert!(selection.skipped.is_empty());

    let exp_lin = selection.get(TrendSpec::ExponentialLinear).unwrap();
    assert_relative_eq!(exp_lin.coefs[1], 1.021_f64.ln(), epsilon = 1e-10);
    assert_eq!(exp_lin.quality.n, 52);
    assert_eq!(exp_lin.years.len(), 65);

    let add_lin = selection.get(TrendSpec::AdditiveLinear).unwrap();
    assert!(exp_lin.quality.sse < add_lin.quality.sse);
    assert!(exp_lin.quality.sse < 1e-18);
}

#[test]
fn test_trend_extends_past_window() {
    let sample = growth_path(2000, 2014, 0.03);
    let window = EstimationWindow::new(2000, 2009).unwrap();

    for spec in TrendSpec::ALL {
        let fit = build_trend(&sample, window, spec).expect("fit should succeed");
        assert_eq!(fit.quality.n, 10);
        assert_eq!(fit.fitted_log.len(), 15);
        assert_eq!(fit.years.first(), Some(&2000));
        assert_eq!(fit.years.last(), Some(&2014));
        assert_eq!(fit.quality.oos_n, 5);
    }

    // Constant growth: the exponential-linear extrapolation is exact.
    let fit = build_trend(&sample, window, TrendSpec::ExponentialLinear).unwrap();
    let last = sample.get(2014).unwrap().value.ln();
    assert_abs_diff_eq!(fit.fitted_log[14], last, epsilon = 1e-9);
}

#[test]
fn test_additive_linear_in_levels() {
    let sample = Sample::from_pairs("X", (1..=6).map(|i| (1990 + i, 100.0 + 5.0 * i as f64))).unwrap();
    let window = EstimationWindow::new(1991, 1996).unwrap();
    let fit = build_trend(&sample, window, TrendSpec::AdditiveLinear).unwrap();

    // Level at t is 100 + 5t, so the fitted log at t=1 is ln(105).
    assert_relative_eq!(fit.coefs[0], 100.0, epsilon = 1e-9);
    assert_relative_eq!(fit.coefs[1], 5.0, epsilon = 1e-10);
    assert_relative_eq!(fit.fitted_log[0], 105.0_f64.ln(), epsilon = 1e-12);
}

// ============================================================================
// Exports
// ============================================================================

#[test]
fn test_exports_round_trip_through_files() {
    let sample = growth_path(1990, 2005, 0.02);
    let window = EstimationWindow::new(1990, 2000).unwrap();
    let selection = fit_all(&sample, window, &TrendSpec::ALL);
    let rows = trend_rows(&sample, &selection.fits).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("fitted.csv");
    write_fitted_csv(&csv_path, &rows, &selection.fits).unwrap();
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "year,in_sample,log_observed,add_lin,add_quad,exp_lin,exp_quad");
    assert_eq!(lines.len(), 1 + 16);

    let json_path = dir.path().join("trends.json");
    let trends = build_trend_file(&sample, window, &selection.fits);
    write_trend_json(&json_path, &trends).unwrap();
    let back = read_trend_json(&json_path).unwrap();
    assert_eq!(back.entity, trends.entity);
    assert_eq!(back.window, window);
    assert_eq!(back.fits.len(), 4);
    assert_eq!(back.observed.len(), 16);
    for (a, b) in back.fits.iter().zip(&trends.fits) {
        assert_eq!(a.spec, b.spec);
        assert_relative_eq!(a.quality.sse, b.quality.sse, epsilon = 1e-12);
    }
}
