//! Estimation window and evaluation horizon.
//!
//! For a sample and a requested window `[year_min, year_max]` we resolve:
//!
//! - `start`: first year of the window actually covered by the sample (`t = 1`)
//! - `periods` (T): number of estimation years
//! - `periods_all` (T_all): years from `start` through the last sample year
//!
//! The window is clamped to the sample's coverage, so `t = 1` always lines up
//! with an observed year.

use tracing::debug;

use crate::domain::{EstimationWindow, Observation, Sample};
use crate::error::TrendError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    /// Calendar year of period `t = 1`.
    pub start: i32,
    /// Calendar year of period `t = T`.
    pub end: i32,
    /// T
    pub periods: usize,
    /// T_all
    pub periods_all: usize,
}

impl Horizon {
    pub fn resolve(sample: &Sample, window: EstimationWindow) -> Result<Self, TrendError> {
        if window.year_min > window.year_max {
            return Err(TrendError::InvalidWindow {
                year_min: window.year_min,
                year_max: window.year_max,
            });
        }

        let start = window.year_min.max(sample.first_year());
        let end = window.year_max.min(sample.last_year());
        if start > end {
            return Err(TrendError::EmptyWindow {
                year_min: window.year_min,
                year_max: window.year_max,
            });
        }
        if start != window.year_min || end != window.year_max {
            debug!(
                requested_min = window.year_min,
                requested_max = window.year_max,
                start,
                end,
                "clamped estimation window to sample coverage"
            );
        }

        // Both differences are non-negative after clamping.
        let periods = (end - start + 1) as usize;
        let periods_all = (sample.last_year() - start + 1) as usize;

        Ok(Self {
            start,
            end,
            periods,
            periods_all,
        })
    }

    /// Calendar year of period `t` (1-based).
    pub fn year_of(&self, t: usize) -> i32 {
        self.start + t as i32 - 1
    }

    /// Years `start ..= start + T_all - 1`.
    pub fn years(&self) -> Vec<i32> {
        (1..=self.periods_all).map(|t| self.year_of(t)).collect()
    }

    /// The T estimation observations.
    pub fn estimation<'a>(&self, sample: &'a Sample) -> &'a [Observation] {
        let offset = (self.start - sample.first_year()) as usize;
        &sample.observations()[offset..offset + self.periods]
    }

    /// Observations after the estimation window (the extrapolation years).
    pub fn holdout<'a>(&self, sample: &'a Sample) -> &'a [Observation] {
        sample.since(self.end + 1)
    }
}
