//! Trend construction for a single specification.
//!
//! Given a sample and an estimation window we:
//! - build the regressors `[1, t, (t^2)]` for `t = 1..=T`
//! - regress levels (additive) or natural logs (exponential) on them
//! - evaluate the fitted polynomial for `t = 1..=T_all`, i.e. also for the
//!   years after the window, and express it in natural-log units
//!
//! Additive trends are fitted in levels and only logged for display. An
//! extrapolated level that is zero or negative has no log and is reported as
//! `TrendError::InvalidDomain` instead of producing NaN.

use tracing::debug;

use crate::domain::{
    EstimationWindow, FitQuality, Observation, ResponseTransform, Sample, TrendFit, TrendSpec,
};
use crate::error::TrendError;
use crate::fit::horizon::Horizon;
use crate::math::regression_coefs;
use crate::models::{design_columns, predict};

/// Fit one trend specification and evaluate it over the extended horizon.
pub fn build_trend(
    sample: &Sample,
    window: EstimationWindow,
    spec: TrendSpec,
) -> Result<TrendFit, TrendError> {
    let horizon = Horizon::resolve(sample, window)?;
    let needed = spec.coef_len();
    if horizon.periods < needed {
        return Err(TrendError::InsufficientObservations {
            needed,
            got: horizon.periods,
        });
    }

    let estimation = horizon.estimation(sample);
    let response = response_vector(spec, estimation)?;
    let regressors = design_columns(spec, horizon.periods);
    let coefs = regression_coefs(&response, &regressors)?;

    let fitted_log = evaluate_trend(spec, &coefs, &horizon)?;
    let quality = fit_quality(sample, &horizon, &fitted_log)?;

    debug!(
        spec = spec.display_name(),
        ?coefs,
        sse = quality.sse,
        t = horizon.periods,
        t_all = horizon.periods_all,
        "fitted trend"
    );

    Ok(TrendFit {
        spec,
        display_name: spec.display_name().to_string(),
        coefs,
        years: horizon.years(),
        fitted_log,
        quality,
    })
}

/// Dependent variable for the regression: levels or natural logs.
pub fn response_vector(spec: TrendSpec, estimation: &[Observation]) -> Result<Vec<f64>, TrendError> {
    match spec.transform() {
        ResponseTransform::Identity => Ok(estimation.iter().map(|o| o.value).collect()),
        ResponseTransform::Log => estimation.iter().map(|o| checked_ln(o.year, o.value)).collect(),
    }
}

/// Evaluate the fitted trend for `t = 1..=T_all`, in natural-log units.
pub fn evaluate_trend(spec: TrendSpec, coefs: &[f64], horizon: &Horizon) -> Result<Vec<f64>, TrendError> {
    (1..=horizon.periods_all)
        .map(|t| {
            let y = predict(spec, t as f64, coefs);
            match spec.transform() {
                ResponseTransform::Identity => checked_ln(horizon.year_of(t), y),
                ResponseTransform::Log => Ok(y),
            }
        })
        .collect()
}

/// Natural log of a strictly positive, finite value.
pub fn checked_ln(year: i32, value: f64) -> Result<f64, TrendError> {
    if value.is_finite() && value > 0.0 {
        Ok(value.ln())
    } else {
        Err(TrendError::InvalidDomain { year, value })
    }
}

/// Residual diagnostics in log units (observed log level minus fitted log trend).
fn fit_quality(sample: &Sample, horizon: &Horizon, fitted_log: &[f64]) -> Result<FitQuality, TrendError> {
    let mut sse = 0.0;
    for (o, &fit) in horizon.estimation(sample).iter().zip(fitted_log) {
        let r = checked_ln(o.year, o.value)? - fit;
        sse += r * r;
    }
    let n = horizon.periods;
    let rmse = (sse / n as f64).sqrt();

    // A holdout year without a log is left out of the diagnostic.
    let mut oos_sse = 0.0;
    let mut oos_n = 0;
    for (o, &fit) in horizon.holdout(sample).iter().zip(&fitted_log[horizon.periods..]) {
        let Ok(log_obs) = checked_ln(o.year, o.value) else {
            debug!(year = o.year, value = o.value, "holdout year left out of diagnostics");
            continue;
        };
        let r = log_obs - fit;
        oos_sse += r * r;
        oos_n += 1;
    }
    let oos_rmse = (oos_n > 0).then(|| (oos_sse / oos_n as f64).sqrt());

    Ok(FitQuality {
        sse,
        rmse,
        n,
        oos_rmse,
        oos_n,
    })
}
