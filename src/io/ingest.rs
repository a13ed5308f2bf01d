//! Penn World Table CSV ingest.
//!
//! This module turns a PWT extract (one row per country-year) into a clean
//! `Sample` of real GDP per capita for one country:
//!
//! - required columns: `country`, `year`, `rgdpe`, `pop` (case-insensitive,
//!   surrounding whitespace and a UTF-8 BOM are ignored)
//! - the country is matched case-insensitively against `country`, or against
//!   `countrycode` when that column exists (e.g. `BEL`)
//! - per-capita value = `rgdpe / pop`
//! - rows with missing/invalid numbers are skipped and reported, never imputed

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::Sample;
use crate::error::AppError;

const REQUIRED_COLUMNS: [&str; 4] = ["country", "year", "rgdpe", "pop"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the country's sample + row diagnostics.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub sample: Sample,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load the per-capita series for `country` from a PWT CSV file.
pub fn load_pwt_sample(path: &Path, country: &str) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    let data = read_pwt_sample(file, country)?;
    info!(
        path = %path.display(),
        country,
        rows_read = data.rows_read,
        rows_used = data.rows_used,
        row_errors = data.row_errors.len(),
        "loaded PWT sample"
    );
    Ok(data)
}

/// Same as [`load_pwt_sample`] but from any reader.
pub fn read_pwt_sample<R: Read>(reader: R, country: &str) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    for name in REQUIRED_COLUMNS {
        if !header_map.contains_key(name) {
            return Err(AppError::new(2, format!("Missing required column: `{name}`")));
        }
    }

    let wanted = country.trim().to_ascii_lowercase();
    let mut pairs = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header line + 1-based numbering.
        let line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        if !matches_country(&record, &header_map, &wanted) {
            continue;
        }
        rows_read += 1;

        match parse_row(&record, &header_map) {
            Ok(pair) => pairs.push(pair),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    for e in &row_errors {
        warn!(line = e.line, "{}", e.message);
    }

    if pairs.is_empty() {
        return Err(AppError::new(
            3,
            format!("No usable rows for country '{country}'."),
        ));
    }

    let rows_used = pairs.len();
    let sample = Sample::from_pairs(country.trim(), pairs)?;

    Ok(IngestedData {
        sample,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel exports often prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn matches_country(record: &StringRecord, header_map: &HashMap<String, usize>, wanted: &str) -> bool {
    ["country", "countrycode"].iter().any(|col| {
        get_optional(record, header_map, col)
            .map(|v| v.eq_ignore_ascii_case(wanted))
            .unwrap_or(false)
    })
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<(i32, f64), String> {
    let year_raw = get_required(record, header_map, "year")?;
    let year = year_raw
        .parse::<i32>()
        .or_else(|_| {
            // Some exports write years as floats ("1955.0").
            year_raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.fract() == 0.0 && v.abs() < 1e6)
                .map(|v| v as i32)
                .ok_or(())
        })
        .map_err(|_| format!("Invalid `year` value '{year_raw}'."))?;

    let rgdpe = parse_f64(get_required(record, header_map, "rgdpe")?)
        .ok_or_else(|| format!("Invalid `rgdpe` value in {year}."))?;
    let pop = parse_f64(get_required(record, header_map, "pop")?)
        .ok_or_else(|| format!("Invalid `pop` value in {year}."))?;
    if pop <= 0.0 {
        return Err(format!("Non-positive `pop` in {year}."));
    }

    Ok((year, rgdpe / pop))
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    get_optional(record, header_map, name).ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_f64(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\u{feff}countrycode,Country,year,rgdpe,pop\n\
        BEL,Belgium,1955,100.0,10.0\n\
        FRA,France,1955,500.0,40.0\n\
        BEL,Belgium,1956,121.0,11.0\n\
        BEL,Belgium,1957,,11.0\n";

    #[test]
    fn computes_per_capita_values_for_one_country() {
        let data = read_pwt_sample(&CSV.as_bytes()[..], "Belgium").unwrap();
        assert_eq!(data.rows_read, 3);
        assert_eq!(data.rows_used, 2);
        assert_eq!(data.row_errors.len(), 1);
        assert_eq!(data.row_errors[0].line, 5);

        let obs = data.sample.observations();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].year, 1955);
        assert!((obs[0].value - 10.0).abs() < 1e-12);
        assert!((obs[1].value - 11.0).abs() < 1e-12);
    }

    #[test]
    fn matches_country_code() {
        let data = read_pwt_sample(&CSV.as_bytes()[..], "fra").unwrap();
        assert_eq!(data.sample.len(), 1);
        assert!((data.sample.observations()[0].value - 12.5).abs() < 1e-12);
    }

    #[test]
    fn unknown_country_is_no_data() {
        let err = read_pwt_sample(&CSV.as_bytes()[..], "Atlantis").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn missing_column_is_usage_error() {
        let csv = "country,year,rgdpe\nBelgium,1955,1.0\n";
        let err = read_pwt_sample(csv.as_bytes(), "Belgium").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("pop"));
    }
}
