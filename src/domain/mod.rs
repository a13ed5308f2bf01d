//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the input series (`Observation`, `Sample`) and `EstimationWindow`
//! - trend specifications (`TrendSpec`, `SpecSelector`)
//! - fit outputs (`TrendFit`, `FitQuality`, `TrendFile`)
//! - run configuration (`TrendConfig`)

pub mod types;

pub use types::*;
