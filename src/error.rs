//! Crate-wide error type.
//!
//! Errors are split by *who has to act*:
//!
//! - `Configuration`: the caller passed an invalid model type, selector or
//!   sampler setting. Fails fast, before any sampling starts.
//! - `Data`: the input table is defective (missing columns, zero usable rows).
//! - `Sampling`: the posterior sampler diagnosed non-convergence or a
//!   degenerate posterior. Propagated verbatim, never retried.
//!
//! Each variant maps to a distinct process exit code for the `growth` binary.

#[derive(Clone)]
pub enum ModelError {
    Configuration(String),
    Data(String),
    Sampling(String),
}

impl ModelError {
    pub fn configuration(message: impl Into<String>) -> Self {
        ModelError::Configuration(message.into())
    }

    pub fn data(message: impl Into<String>) -> Self {
        ModelError::Data(message.into())
    }

    pub fn sampling(message: impl Into<String>) -> Self {
        ModelError::Sampling(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            ModelError::Configuration(_) => 2,
            ModelError::Data(_) => 3,
            ModelError::Sampling(_) => 4,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ModelError::Configuration(_) => "configuration error",
            ModelError::Data(_) => "data error",
            ModelError::Sampling(_) => "sampling error",
        }
    }

    fn message(&self) -> &str {
        match self {
            ModelError::Configuration(m) | ModelError::Data(m) | ModelError::Sampling(m) => m,
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.label(), self.message())
    }
}

impl std::fmt::Debug for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelError")
            .field("kind", &self.label())
            .field("message", &self.message())
            .finish()
    }
}

impl std::error::Error for ModelError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_kind() {
        let codes = [
            ModelError::configuration("x").exit_code(),
            ModelError::data("x").exit_code(),
            ModelError::sampling("x").exit_code(),
        ];
        assert_eq!(codes, [2, 3, 4]);
    }

    #[test]
    fn display_names_the_kind() {
        let err = ModelError::configuration("unknown model type 'quadratic'");
        let text = err.to_string();
        assert!(text.starts_with("configuration error:"));
        assert!(text.contains("quadratic"));
    }
}
