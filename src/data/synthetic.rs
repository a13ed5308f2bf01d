//! Synthetic GDP-per-capita paths.
//!
//! A constant-growth path with optional multiplicative log-noise:
//!
//! ```text
//! value_t = start * (1 + growth)^(t - first_year) * exp(noise * z_t - noise^2 / 2)
//! ```
//!
//! The `- noise^2 / 2` term keeps `E[exp(.)] == 1`, so the noisy path is
//! unbiased around the deterministic one. Generation is seeded and therefore
//! reproducible.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Sample, SyntheticParams};
use crate::error::AppError;

pub fn generate_sample(params: &SyntheticParams) -> Result<Sample, AppError> {
    if params.last_year < params.first_year {
        return Err(AppError::new(2, "Synthetic last year must be >= first year."));
    }
    if !(params.start_value.is_finite() && params.start_value > 0.0) {
        return Err(AppError::new(2, "Synthetic start value must be positive."));
    }
    if !(params.growth.is_finite() && params.growth > -1.0) {
        return Err(AppError::new(2, "Synthetic growth rate must be > -1."));
    }
    if !(params.noise.is_finite() && params.noise >= 0.0) {
        return Err(AppError::new(2, "Synthetic noise must be >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(sample_seed(params));
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;
    let mean_correction = 0.5 * params.noise * params.noise;

    let pairs = (params.first_year..=params.last_year).map(|year| {
        let base = params.start_value * (1.0 + params.growth).powi(year - params.first_year);
        let value = if params.noise > 0.0 {
            let z: f64 = normal.sample(&mut rng);
            base * (params.noise * z - mean_correction).exp()
        } else {
            base
        };
        (year, value)
    });

    let label = format!("synthetic (g={:.2}%)", params.growth * 100.0);
    Ok(Sample::from_pairs(label, pairs.collect::<Vec<_>>())?)
}

fn sample_seed(params: &SyntheticParams) -> u64 {
    let mut hasher = DefaultHasher::new();
    params.seed.hash(&mut hasher);
    params.first_year.hash(&mut hasher);
    params.last_year.hash(&mut hasher);
    params.start_value.to_bits().hash(&mut hasher);
    params.growth.to_bits().hash(&mut hasher);
    params.noise.to_bits().hash(&mut hasher);
    hasher.finish()
}
