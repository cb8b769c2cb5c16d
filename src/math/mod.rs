//! Mathematical utilities: least squares, scalar statistics, log-densities.

pub mod ols;
pub mod stats;

pub use ols::*;
pub use stats::*;
