//! Top-level application orchestration.
//!
//! `src/main.rs` only maps the result to an exit code. This module:
//! - parses CLI arguments
//! - loads the GDP-per-capita series (PWT CSV, FRED or synthetic)
//! - fits the additive/exponential linear/quadratic trends
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Command, FitArgs, PlotArgs};
use crate::domain::{EstimationWindow, SyntheticParams, TrendConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `trend` binary.
pub fn run() -> Result<(), AppError> {
    // We want `trend --file pwt.csv` to behave like `trend fit --file pwt.csv`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => {
            init_tracing();
            handle_fit(args)
        }
        Command::Plot(args) => {
            init_tracing();
            handle_plot(args)
        }
        // No subscriber: log lines on stderr would tear the alternate screen.
        Command::Tui(args) => handle_tui(args),
    }
}

/// Structured logs to stderr, filtered by `RUST_LOG` (default: warnings only).
fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gdp_trend=warn".into()),
        )
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = config_from_args(&args)?;
    let run = pipeline::run_fit(&config)?;

    for note in &run.ingest_notes {
        eprintln!("warning: skipped {note}");
    }

    println!(
        "{}",
        crate::report::format_run_summary(
            run.sample.entity(),
            &run.sample.stats(),
            config.window,
            &run.selection
        )
    );
    println!(
        "{}",
        crate::report::format_trend_table(&run.rows, &run.selection.fits)
    );

    if config.plot {
        let plot = crate::plot::render_trend_plot(
            run.sample.observations(),
            &run.selection.fits,
            config.plot_width,
            config.plot_height,
        )?;
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_fitted {
        crate::io::write_fitted_csv(path, &run.rows, &run.selection.fits)?;
        info!(path = %path.display(), "overlay CSV written");
    }
    if let Some(path) = &config.export_trends {
        let trends = crate::io::build_trend_file(&run.sample, config.window, &run.selection.fits);
        crate::io::write_trend_json(path, &trends)?;
        info!(path = %path.display(), "trend JSON written");
    }
    if config.debug_bundle {
        let path = crate::debug::write_debug_bundle(&run.sample, config.window, &config.spec.specs())?;
        println!("Debug bundle written to {}", path.display());
    }

    Ok(())
}

fn handle_tui(args: FitArgs) -> Result<(), AppError> {
    let config = config_from_args(&args)?;
    crate::tui::run(config)
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let trends = crate::io::read_trend_json(&args.trends)?;
    let plot = crate::plot::render_trend_file(&trends, args.width, args.height)?;
    println!("{plot}");
    Ok(())
}

pub fn config_from_args(args: &FitArgs) -> Result<TrendConfig, AppError> {
    let window = EstimationWindow::new(args.year_min, args.year_max)?;
    Ok(TrendConfig {
        source: args.source,
        file: args.file.clone(),
        country: args.country.clone(),
        series: args.series.clone(),
        synthetic: SyntheticParams {
            first_year: args.first_year,
            last_year: args.last_year,
            start_value: args.start_value,
            growth: args.growth,
            noise: args.noise,
            seed: args.seed,
        },
        window,
        spec: args.spec,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_fitted: args.export.clone(),
        export_trends: args.export_trends.clone(),
        debug_bundle: args.debug_bundle,
    })
}

/// Rewrite argv so bare flags default to `trend fit`.
///
/// Rules:
/// - `trend`                      -> `trend fit`
/// - `trend --file x.csv ...`     -> `trend fit --file x.csv ...`
/// - `trend --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("fit".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "plot" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "fit flags".
    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
