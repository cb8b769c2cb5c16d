//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - model selection enums (`ModelType`, `CurveKind`)
//! - group identity (`ClassMetadata`)
//! - prior and sampler configuration (`PriorConfig`, `SamplerSettings`)
//! - posterior summary types (`ParamSummary`)

pub mod types;

pub use types::*;
