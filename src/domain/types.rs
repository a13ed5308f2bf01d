//! Shared domain types.
//!
//! Plain data, serializable where it ends up in a trend JSON file.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::TrendError;

/// One annual observation of real GDP per capita (levels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub year: i32,
    pub value: f64,
}

impl Observation {
    pub fn new(year: i32, value: f64) -> Self {
        Self { year, value }
    }
}

/// An annual series for a single entity (country or FRED series).
///
/// Invariants (enforced by [`Sample::new`]):
/// - at least one observation
/// - years strictly increasing by exactly one (sorted, contiguous, no duplicates)
/// - every value finite
///
/// Positivity is *not* required here; it only matters when a value is logged,
/// and that is reported by the trend builder with the offending year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SampleFields")]
pub struct Sample {
    entity: String,
    observations: Vec<Observation>,
}

/// Unchecked wire form of `Sample`.
#[derive(Deserialize)]
struct SampleFields {
    entity: String,
    observations: Vec<Observation>,
}

impl TryFrom<SampleFields> for Sample {
    type Error = TrendError;

    fn try_from(fields: SampleFields) -> Result<Self, Self::Error> {
        Sample::new(fields.entity, fields.observations)
    }
}

impl Sample {
    pub fn new(entity: impl Into<String>, observations: Vec<Observation>) -> Result<Self, TrendError> {
        let entity = entity.into();
        if observations.is_empty() {
            return Err(TrendError::InvalidSample(format!("no observations for '{entity}'")));
        }
        for pair in observations.windows(2) {
            let (prev, next) = (pair[0].year, pair[1].year);
            if next <= prev {
                return Err(TrendError::InvalidSample(format!(
                    "years must be strictly increasing ({prev} followed by {next})"
                )));
            }
            if next != prev + 1 {
                return Err(TrendError::InvalidSample(format!(
                    "years must be contiguous (gap between {prev} and {next})"
                )));
            }
        }
        if let Some(bad) = observations.iter().find(|o| !o.value.is_finite()) {
            return Err(TrendError::InvalidSample(format!(
                "non-finite value {} in year {}",
                bad.value, bad.year
            )));
        }
        Ok(Self {
            entity,
            observations,
        })
    }

    /// Build a sample from `(year, value)` pairs, sorting by year first.
    pub fn from_pairs(
        entity: impl Into<String>,
        pairs: impl IntoIterator<Item = (i32, f64)>,
    ) -> Result<Self, TrendError> {
        let mut observations: Vec<Observation> =
            pairs.into_iter().map(|(year, value)| Observation::new(year, value)).collect();
        observations.sort_by_key(|o| o.year);
        Self::new(entity, observations)
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_year(&self) -> i32 {
        self.observations[0].year
    }

    pub fn last_year(&self) -> i32 {
        self.observations[self.observations.len() - 1].year
    }

    /// Observation for `year`, if the sample covers it.
    pub fn get(&self, year: i32) -> Option<&Observation> {
        let offset = usize::try_from(year.checked_sub(self.first_year())?).ok()?;
        self.observations.get(offset)
    }

    /// Observations with `year >= from`, in order.
    pub fn since(&self, from: i32) -> &[Observation] {
        let start = self
            .observations
            .iter()
            .position(|o| o.year >= from)
            .unwrap_or(self.observations.len());
        &self.observations[start..]
    }

    pub fn stats(&self) -> DatasetStats {
        let (value_min, value_max) = self
            .observations
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), o| {
                (lo.min(o.value), hi.max(o.value))
            });
        DatasetStats {
            n_points: self.observations.len(),
            year_first: self.first_year(),
            year_last: self.last_year(),
            value_min,
            value_max,
        }
    }
}

/// Summary stats about a loaded sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
    pub n_points: usize,
    pub year_first: i32,
    pub year_last: i32,
    pub value_min: f64,
    pub value_max: f64,
}

/// Inclusive estimation window `[year_min, year_max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimationWindow {
    pub year_min: i32,
    pub year_max: i32,
}

impl EstimationWindow {
    pub fn new(year_min: i32, year_max: i32) -> Result<Self, TrendError> {
        if year_min > year_max {
            return Err(TrendError::InvalidWindow { year_min, year_max });
        }
        Ok(Self { year_min, year_max })
    }
}

/// Transform applied to the observed levels before regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseTransform {
    /// Regress levels (additive trend).
    Identity,
    /// Regress natural logs (exponential trend).
    Log,
}

/// Polynomial degree of the time trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolyDegree {
    Linear,
    Quadratic,
}

/// Concrete trend specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrendSpec {
    AdditiveLinear,
    AdditiveQuadratic,
    ExponentialLinear,
    ExponentialQuadratic,
}

impl TrendSpec {
    pub const ALL: [TrendSpec; 4] = [
        TrendSpec::AdditiveLinear,
        TrendSpec::AdditiveQuadratic,
        TrendSpec::ExponentialLinear,
        TrendSpec::ExponentialQuadratic,
    ];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            TrendSpec::AdditiveLinear => "Additive, linear",
            TrendSpec::AdditiveQuadratic => "Additive, quadratic",
            TrendSpec::ExponentialLinear => "Exponential, linear",
            TrendSpec::ExponentialQuadratic => "Exponential, quadratic",
        }
    }

    /// Short column name used in CSV exports.
    pub fn column_name(self) -> &'static str {
        match self {
            TrendSpec::AdditiveLinear => "add_lin",
            TrendSpec::AdditiveQuadratic => "add_quad",
            TrendSpec::ExponentialLinear => "exp_lin",
            TrendSpec::ExponentialQuadratic => "exp_quad",
        }
    }

    pub fn transform(self) -> ResponseTransform {
        match self {
            TrendSpec::AdditiveLinear | TrendSpec::AdditiveQuadratic => ResponseTransform::Identity,
            TrendSpec::ExponentialLinear | TrendSpec::ExponentialQuadratic => ResponseTransform::Log,
        }
    }

    pub fn degree(self) -> PolyDegree {
        match self {
            TrendSpec::AdditiveLinear | TrendSpec::ExponentialLinear => PolyDegree::Linear,
            TrendSpec::AdditiveQuadratic | TrendSpec::ExponentialQuadratic => PolyDegree::Quadratic,
        }
    }

    /// Number of regression coefficients (intercept included).
    pub fn coef_len(self) -> usize {
        match self.degree() {
            PolyDegree::Linear => 2,
            PolyDegree::Quadratic => 3,
        }
    }
}

/// Which specification(s) to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SpecSelector {
    All,
    Additive,
    Exponential,
    AdditiveLinear,
    AdditiveQuadratic,
    ExponentialLinear,
    ExponentialQuadratic,
}

impl SpecSelector {
    pub fn specs(self) -> Vec<TrendSpec> {
        match self {
            SpecSelector::All => TrendSpec::ALL.to_vec(),
            SpecSelector::Additive => vec![TrendSpec::AdditiveLinear, TrendSpec::AdditiveQuadratic],
            SpecSelector::Exponential => {
                vec![TrendSpec::ExponentialLinear, TrendSpec::ExponentialQuadratic]
            }
            SpecSelector::AdditiveLinear => vec![TrendSpec::AdditiveLinear],
            SpecSelector::AdditiveQuadratic => vec![TrendSpec::AdditiveQuadratic],
            SpecSelector::ExponentialLinear => vec![TrendSpec::ExponentialLinear],
            SpecSelector::ExponentialQuadratic => vec![TrendSpec::ExponentialQuadratic],
        }
    }
}

/// Where the sample comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Penn World Table extract (CSV with `country,year,rgdpe,pop`).
    Pwt,
    /// An annual FRED series (requires `FRED_API_KEY`).
    Fred,
    /// Deterministic synthetic growth path.
    Synthetic,
}

/// Parameters of the synthetic growth path.
///
/// `value_t = start_value * (1 + growth)^(t - first_year) * exp(noise * z_t)`
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticParams {
    pub first_year: i32,
    pub last_year: i32,
    pub start_value: f64,
    pub growth: f64,
    /// Standard deviation of the log-noise (0 disables noise).
    pub noise: f64,
    pub seed: u64,
}

/// Fit quality diagnostics, measured in natural-log units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    /// In-sample sum of squared residuals.
    pub sse: f64,
    /// In-sample root mean squared residual.
    pub rmse: f64,
    /// Number of estimation periods (T).
    pub n: usize,
    /// RMSE over observed years after the estimation window, if any.
    pub oos_rmse: Option<f64>,
    pub oos_n: usize,
}

/// Fitted trend for one specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    pub spec: TrendSpec,
    pub display_name: String,
    /// Coefficients in regressor order: intercept, t, (t^2).
    pub coefs: Vec<f64>,
    /// Years covered by `fitted_log` (`year_min ..= year_min + T_all - 1`).
    pub years: Vec<i32>,
    /// Fitted trend in natural-log units, one entry per period `t = 1..=T_all`.
    pub fitted_log: Vec<f64>,
    pub quality: FitQuality,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct TrendConfig {
    pub source: SourceKind,
    pub file: Option<PathBuf>,
    pub country: String,
    pub series: Option<String>,
    pub synthetic: SyntheticParams,

    pub window: EstimationWindow,
    pub spec: SpecSelector,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_fitted: Option<PathBuf>,
    pub export_trends: Option<PathBuf>,
    pub debug_bundle: bool,
}

/// A saved trend file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendFile {
    pub tool: String,
    pub entity: String,
    pub window: EstimationWindow,
    /// Observed levels from the window start onwards.
    pub observed: Vec<Observation>,
    pub fits: Vec<TrendFit>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rejects_gaps_and_duplicates() {
        let gap = Sample::from_pairs("X", [(2000, 1.0), (2002, 2.0)]);
        assert!(matches!(gap, Err(TrendError::InvalidSample(_))));

        let dup = Sample::from_pairs("X", [(2000, 1.0), (2000, 2.0)]);
        assert!(matches!(dup, Err(TrendError::InvalidSample(_))));

        let empty = Sample::new("X", Vec::new());
        assert!(matches!(empty, Err(TrendError::InvalidSample(_))));
    }

    #[test]
    fn sample_sorts_pairs_and_indexes_by_year() {
        let sample = Sample::from_pairs("X", [(2001, 2.0), (2000, 1.0), (2002, 3.0)]).unwrap();
        assert_eq!(sample.first_year(), 2000);
        assert_eq!(sample.last_year(), 2002);
        assert_eq!(sample.get(2001).map(|o| o.value), Some(2.0));
        assert!(sample.get(1999).is_none());
        assert!(sample.get(2003).is_none());
        assert_eq!(sample.since(2001).len(), 2);
        assert!(sample.since(2010).is_empty());
    }

    #[test]
    fn deserialized_sample_is_validated() {
        let ok: Sample = serde_json::from_str(
            r#"{"entity":"X","observations":[{"year":2000,"value":1.0},{"year":2001,"value":2.0}]}"#,
        )
        .unwrap();
        assert_eq!(ok.last_year(), 2001);

        let empty = serde_json::from_str::<Sample>(r#"{"entity":"X","observations":[]}"#);
        assert!(empty.unwrap_err().to_string().contains("no observations"));

        let gap = serde_json::from_str::<Sample>(
            r#"{"entity":"X","observations":[{"year":2000,"value":1.0},{"year":2003,"value":2.0}]}"#,
        );
        assert!(gap.is_err());
    }

    #[test]
    fn window_rejects_inverted_bounds() {
        assert!(EstimationWindow::new(1955, 2006).is_ok());
        assert_eq!(
            EstimationWindow::new(2006, 1955),
            Err(TrendError::InvalidWindow {
                year_min: 2006,
                year_max: 1955
            })
        );
    }

    #[test]
    fn spec_shapes() {
        assert_eq!(TrendSpec::AdditiveLinear.coef_len(), 2);
        assert_eq!(TrendSpec::ExponentialQuadratic.coef_len(), 3);
        assert_eq!(TrendSpec::AdditiveQuadratic.transform(), ResponseTransform::Identity);
        assert_eq!(TrendSpec::ExponentialLinear.transform(), ResponseTransform::Log);
        assert_eq!(SpecSelector::All.specs(), TrendSpec::ALL.to_vec());
        assert_eq!(SpecSelector::Exponential.specs().len(), 2);
    }
}
