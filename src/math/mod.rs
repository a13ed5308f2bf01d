//! Mathematical utilities: the normal-equations OLS solver.

pub mod ols;

pub use ols::*;
