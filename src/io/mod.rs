//! Output helpers.
//!
//! - YAML fit-report export (`export`)
//! - posterior-predictive band CSV export (`export`)

pub mod export;

pub use export::*;
