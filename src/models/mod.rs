//! Trend model implementations.
//!
//! Models are implemented as small, pure functions so that the builder can
//! stay generic over the four specifications.

pub mod model;

pub use model::*;
