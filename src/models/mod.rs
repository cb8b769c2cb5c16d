//! Growth-curve model implementations.
//!
//! Models are implemented as small, pure functions so that fitting and
//! posterior-predictive code can stay generic.

pub mod curve;

pub use curve::*;
