//! FRED API integration for annual GDP-per-capita series.
//!
//! Any annual series works (for example the Penn World Table series FRED
//! republishes per country). Each observation date is mapped to its calendar
//! year; missing values (`"."`) are skipped.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::Sample;
use crate::error::AppError;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const OBS_LIMIT: usize = 10000;

pub struct FredClient {
    client: Client,
    api_key: String,
}

impl FredClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("FRED_API_KEY")
            .map_err(|_| AppError::new(2, "Missing FRED_API_KEY in environment (.env)."))?;
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }

    /// Fetch an annual series and return it as a `Sample` labelled by the series id.
    pub fn fetch_sample(&self, series_id: &str) -> Result<Sample, AppError> {
        let obs = self.fetch_series(series_id)?;
        if obs.is_empty() {
            return Err(AppError::new(
                3,
                format!("No observations returned for series {series_id}."),
            ));
        }
        let pairs = annual_values(&obs);
        info!(series = series_id, n = pairs.len(), "fetched FRED series");
        Ok(Sample::from_pairs(series_id, pairs)?)
    }

    fn fetch_series(&self, series_id: &str) -> Result<Vec<(NaiveDate, f64)>, AppError> {
        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("series_id", series_id),
                ("api_key", &self.api_key),
                ("file_type", "json"),
                ("sort_order", "asc"),
                ("frequency", "a"),
                ("limit", &OBS_LIMIT.to_string()),
            ])
            .send()
            .map_err(|e| AppError::new(4, format!("FRED request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("FRED request failed with status {}.", resp.status()),
            ));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse FRED response: {e}")))?;

        let mut out = Vec::new();
        for obs in body.observations {
            let Some(value) = parse_value(&obs.value) else {
                debug!(series = series_id, date = %obs.date, "skipping missing FRED value");
                continue;
            };
            let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d")
                .map_err(|e| AppError::new(4, format!("Invalid FRED date '{}': {e}", obs.date)))?;
            out.push((date, value));
        }

        Ok(out)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() {
        Some(v)
    } else {
        None
    }
}

/// One value per calendar year; for repeated years the latest date wins.
fn annual_values(obs: &[(NaiveDate, f64)]) -> Vec<(i32, f64)> {
    let mut by_year: BTreeMap<i32, (NaiveDate, f64)> = BTreeMap::new();
    for &(date, value) in obs {
        let entry = by_year.entry(date.year()).or_insert((date, value));
        if date >= entry.0 {
            *entry = (date, value);
        }
    }
    by_year.into_iter().map(|(year, (_, v))| (year, v)).collect()
}
