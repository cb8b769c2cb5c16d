//! Result models and formatted terminal output.
//!
//! - `results`: the serializable data-model layer (`to_dict` / `to_yaml`)
//! - `format`: terminal summary rendering
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

pub mod format;
pub mod results;

pub use format::*;
pub use results::*;
