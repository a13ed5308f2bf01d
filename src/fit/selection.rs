//! Fit several trend specifications side by side.
//!
//! Each specification is independent: it builds its own design, solves its
//! own regression and evaluates its own trend. We therefore fit them in
//! parallel, and a failure in one specification is recorded in `skipped`
//! without affecting the others.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::domain::{EstimationWindow, Sample, TrendFit, TrendSpec};
use crate::error::TrendError;
use crate::fit::builder::build_trend;

/// Output of fitting all requested specifications.
#[derive(Debug, Clone)]
pub struct TrendSelection {
    /// Successful fits, in the order the specifications were requested.
    pub fits: Vec<TrendFit>,
    /// Specifications that failed and why.
    pub skipped: Vec<(TrendSpec, TrendError)>,
}

impl TrendSelection {
    pub fn get(&self, spec: TrendSpec) -> Option<&TrendFit> {
        self.fits.iter().find(|f| f.spec == spec)
    }

    /// Fit with the lowest in-sample SSE (log units).
    pub fn best(&self) -> Option<&TrendFit> {
        self.fits.iter().min_by(|a, b| {
            a.quality
                .sse
                .partial_cmp(&b.quality.sse)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

/// Fit each requested specification on the same sample and window.
pub fn fit_all(sample: &Sample, window: EstimationWindow, specs: &[TrendSpec]) -> TrendSelection {
    // `collect` on an indexed parallel iterator keeps input order.
    let results: Vec<(TrendSpec, Result<TrendFit, TrendError>)> = specs
        .par_iter()
        .map(|&spec| (spec, build_trend(sample, window, spec)))
        .collect();

    let mut fits = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();
    for (spec, result) in results {
        match result {
            Ok(fit) => {
                info!(
                    spec = spec.display_name(),
                    coefs = ?fit.coefs,
                    sse = fit.quality.sse,
                    "trend fitted"
                );
                fits.push(fit);
            }
            Err(err) => {
                warn!(spec = spec.display_name(), error = %err, "trend skipped");
                skipped.push((spec, err));
            }
        }
    }

    TrendSelection { fits, skipped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_spec_does_not_affect_others() {
        // Two periods: enough for linear trends, not for quadratic ones.
        let sample = Sample::from_pairs("X", [(2000, 100.0), (2001, 110.0), (2002, 120.0)]).unwrap();
        let window = EstimationWindow::new(2000, 2001).unwrap();
        let selection = fit_all(&sample, window, &TrendSpec::ALL);

        let fitted: Vec<TrendSpec> = selection.fits.iter().map(|f| f.spec).collect();
        assert_eq!(fitted, vec![TrendSpec::AdditiveLinear, TrendSpec::ExponentialLinear]);
        assert_eq!(selection.skipped.len(), 2);
        assert!(selection
            .skipped
            .iter()
            .all(|(_, e)| matches!(e, TrendError::InsufficientObservations { needed: 3, got: 2 })));
        assert!(selection.get(TrendSpec::AdditiveQuadratic).is_none());
    }
}
