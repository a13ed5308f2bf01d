//! Sample sources other than files: FRED and synthetic paths.

pub mod fred;
pub mod synthetic;

pub use fred::FredClient;
pub use synthetic::generate_sample;
