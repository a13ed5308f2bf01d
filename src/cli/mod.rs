//! Command-line parsing for the GDP-per-capita trend fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{SourceKind, SpecSelector};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "trend", version, about = "Deterministic trends for real GDP per capita")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the trend specifications, print diagnostics, and optionally plot/export.
    Fit(FitArgs),
    /// Plot a previously exported trend JSON.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying fit pipeline as `trend fit`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(FitArgs),
}

/// Options shared by `fit` and `tui`.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Where the GDP-per-capita series comes from.
    #[arg(long, value_enum, default_value_t = SourceKind::Pwt)]
    pub source: SourceKind,

    /// Penn World Table CSV extract (for `--source pwt`).
    #[arg(short = 'f', long, value_name = "CSV")]
    pub file: Option<PathBuf>,

    /// Country name or ISO code to select from the PWT file.
    #[arg(short = 'c', long, default_value = "Belgium")]
    pub country: String,

    /// FRED series id (for `--source fred`).
    #[arg(long)]
    pub series: Option<String>,

    /// First year of the estimation window.
    #[arg(long, default_value_t = 1955, allow_negative_numbers = true)]
    pub year_min: i32,

    /// Last year of the estimation window.
    #[arg(long, default_value_t = 2006, allow_negative_numbers = true)]
    pub year_max: i32,

    /// Which trend specification(s) to fit.
    #[arg(long, value_enum, default_value_t = SpecSelector::All)]
    pub spec: SpecSelector,

    /// Synthetic source: level in the first year.
    #[arg(long, default_value_t = 100.0)]
    pub start_value: f64,

    /// Synthetic source: annual growth rate (0.021 = 2.1%).
    #[arg(long, default_value_t = 0.021, allow_negative_numbers = true)]
    pub growth: f64,

    /// Synthetic source: standard deviation of the log-noise.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Synthetic source: random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Synthetic source: first year.
    #[arg(long, default_value_t = 1950)]
    pub first_year: i32,

    /// Synthetic source: last year.
    #[arg(long, default_value_t = 2019)]
    pub last_year: i32,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows per panel).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the per-year overlay (log observed vs fitted) to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export observed series and all fits to JSON.
    #[arg(long = "export-trends", value_name = "JSON")]
    pub export_trends: Option<PathBuf>,

    /// Write a markdown bundle with the regression matrices under `./debug/`.
    #[arg(long)]
    pub debug_bundle: bool,
}

/// Options for plotting saved trends.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Trend JSON file produced by `trend fit --export-trends`.
    #[arg(long, value_name = "JSON")]
    pub trends: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows per panel).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}
