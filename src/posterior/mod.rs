//! Posterior traces and posterior-predictive computation.
//!
//! - `trace`: draws per chain per parameter, group-key qualification,
//!   convergence gating and summaries
//! - `predict`: predictive mean distributions (`get_mu_pp`) and HDI bands

pub mod predict;
pub mod trace;

pub use predict::*;
pub use trace::*;
