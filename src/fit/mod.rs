//! Trend fitting orchestration.
//!
//! Responsibilities:
//!
//! - resolve the estimation window and extended horizon (`horizon`)
//! - fit and evaluate a single specification (`builder`)
//! - fit all requested specifications independently, in parallel (`selection`)

pub mod builder;
pub mod horizon;
pub mod selection;

pub use builder::*;
pub use horizon::*;
pub use selection::*;
