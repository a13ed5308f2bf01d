//! Error types.
//!
//! - `TrendError`: typed failures of the numeric core (solver + trend builder)
//! - `AppError`: what the binary reports, carrying a process exit code
//!
//! Exit codes:
//! - `2`: usage / input problems (bad flags, unreadable files)
//! - `3`: no usable data (empty sample, empty window)
//! - `4`: runtime failures (network, terminal, numerics)

use thiserror::Error;

/// Failures of the regression solver and trend builder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrendError {
    #[error("dimension mismatch: regressor {column} has {got} elements but the response has {expected}")]
    DimensionMismatch {
        expected: usize,
        got: usize,
        column: usize,
    },

    #[error("no regressors supplied")]
    NoRegressors,

    #[error("Gram matrix X'X is singular or nearly singular ({reason})")]
    SingularMatrix { reason: String },

    #[error("cannot take the natural log of {value} (year {year})")]
    InvalidDomain { year: i32, value: f64 },

    #[error("insufficient observations: need at least {needed}, got {got}")]
    InsufficientObservations { needed: usize, got: usize },

    #[error("invalid sample: {0}")]
    InvalidSample(String),

    #[error("estimation window {year_min}..={year_max} is invalid")]
    InvalidWindow { year_min: i32, year_max: i32 },

    #[error("estimation window {year_min}..={year_max} selects no observations")]
    EmptyWindow { year_min: i32, year_max: i32 },
}

impl TrendError {
    pub(crate) fn singular(reason: impl Into<String>) -> Self {
        TrendError::SingularMatrix {
            reason: reason.into(),
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<TrendError> for AppError {
    fn from(err: TrendError) -> Self {
        let exit_code = match err {
            TrendError::InvalidSample(_)
            | TrendError::EmptyWindow { .. }
            | TrendError::InsufficientObservations { .. } => 3,
            TrendError::InvalidWindow { .. } => 2,
            _ => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_errors_map_to_exit_codes() {
        let empty: AppError = TrendError::EmptyWindow {
            year_min: 2030,
            year_max: 2040,
        }
        .into();
        assert_eq!(empty.exit_code(), 3);

        let singular: AppError = TrendError::singular("pivot is zero").into();
        assert_eq!(singular.exit_code(), 4);
        assert!(singular.to_string().contains("pivot is zero"));
    }
}
