//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to YAML/CSV alongside posterior summaries
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::keys::snake_case_string;

/// Which regression model to fit.
///
/// Dispatch on this enum is exhaustive; the string form used by config files
/// and CLIs goes through [`ModelType::parse`] so an unknown name fails with a
/// configuration error naming the offending type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Intercept + slope with Gaussian noise.
    Linear,
    /// Nonlinear regression whose mean function is a growth curve.
    GrowthCurve,
}

impl ModelType {
    /// Parse the wire/config string form (`"linear"`, `"growth_curve"`).
    pub fn parse(s: &str) -> Result<Self, ModelError> {
        match s {
            "linear" => Ok(ModelType::Linear),
            "growth_curve" => Ok(ModelType::GrowthCurve),
            other => Err(ModelError::configuration(format!(
                "Unknown model type '{other}' (expected 'linear' or 'growth_curve')."
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelType::Linear => "linear",
            ModelType::GrowthCurve => "growth_curve",
        }
    }
}

/// Growth-curve variant for nonlinear fits.
///
/// Parameters are only meaningful jointly with the variant that defines them;
/// a biphasic `h` has no interpretation under the monophasic curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CurveKind {
    /// Monophasic von Bertalanffy: `linf`, `k`, `t0`.
    Monophasic,
    /// Biphasic von Bertalanffy: adds `h` (phase magnitude) and `th` (phase age).
    Biphasic,
}

impl CurveKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            CurveKind::Monophasic => "monophasic von Bertalanffy",
            CurveKind::Biphasic => "biphasic von Bertalanffy",
        }
    }

    /// Curve parameter names, in sampling order (noise scale excluded).
    pub fn parameter_names(self) -> &'static [&'static str] {
        match self {
            CurveKind::Monophasic => &["linf", "k", "t0"],
            CurveKind::Biphasic => &["linf", "k", "t0", "h", "th"],
        }
    }
}

/// Identity of one fitted group (species/sex/location slice).
///
/// The trace-key derivation in `keys` uses this to qualify parameter names so
/// draws from different groups can live in one shared mapping without
/// collisions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetadata {
    pub species: String,
    pub sex: Option<String>,
    pub location: Option<String>,
}

impl ClassMetadata {
    pub fn new(species: impl Into<String>) -> Self {
        ClassMetadata {
            species: species.into(),
            sex: None,
            location: None,
        }
    }

    pub fn with_sex(mut self, sex: impl Into<String>) -> Self {
        self.sex = Some(sex.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Canonical group key: snake-cased segments joined with `::`.
    ///
    /// Snake-cased output never contains `:`, so two distinct groups cannot
    /// produce the same key.
    pub fn group_key(&self) -> String {
        let sex = self.sex.as_deref().unwrap_or("all");
        let location = self.location.as_deref().unwrap_or("all");
        format!(
            "{}::{}::{}",
            snake_case_string(&self.species),
            snake_case_string(sex),
            snake_case_string(location)
        )
    }
}

/// A Normal prior.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NormalPrior {
    pub mean: f64,
    pub sd: f64,
}

impl NormalPrior {
    pub fn new(mean: f64, sd: f64) -> Self {
        NormalPrior { mean, sd }
    }
}

/// A half-Normal prior over a strictly positive scale parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HalfNormalPrior {
    pub sd: f64,
}

impl HalfNormalPrior {
    pub fn new(sd: f64) -> Self {
        HalfNormalPrior { sd }
    }
}

/// Prior hyperparameters for every model the builder can construct.
///
/// All priors are deliberately weak so the likelihood dominates on any
/// reasonably sized dataset. Defaults (see `Default`):
///
/// - `intercept ~ Normal(0, 100)`, `slope ~ Normal(0, 10)`
/// - `linf ~ Normal(100, 100)` truncated to `linf > 0`
/// - `k ~ Normal(0.5, 1)` truncated to `k > 0`
/// - `t0 ~ Normal(0, 5)`
/// - `h ~ Normal(0, 50)`, `th ~ Normal(10, 10)` truncated to `th > 0`
/// - `sigma ~ HalfNormal(25)`
///
/// This is an explicit value passed into the builder; there is no module-level
/// default state to mutate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriorConfig {
    pub intercept: NormalPrior,
    pub slope: NormalPrior,
    pub linf: NormalPrior,
    pub k: NormalPrior,
    pub t0: NormalPrior,
    pub h: NormalPrior,
    pub th: NormalPrior,
    pub sigma: HalfNormalPrior,
}

impl Default for PriorConfig {
    fn default() -> Self {
        PriorConfig {
            intercept: NormalPrior::new(0.0, 100.0),
            slope: NormalPrior::new(0.0, 10.0),
            linf: NormalPrior::new(100.0, 100.0),
            k: NormalPrior::new(0.5, 1.0),
            t0: NormalPrior::new(0.0, 5.0),
            h: NormalPrior::new(0.0, 50.0),
            th: NormalPrior::new(10.0, 10.0),
            sigma: HalfNormalPrior::new(25.0),
        }
    }
}

/// Sampler configuration, passed through to the sampling engine.
///
/// Draw/burn-in defaults mirror the project's historical settings
/// (2000 retained draws, 1000 tuning steps per chain).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SamplerSettings {
    /// Retained draws per chain (post-tune).
    pub draws: usize,
    /// Tuning (burn-in) steps per chain; discarded, used for step adaptation.
    pub tune: usize,
    /// Number of independent chains.
    pub chains: usize,
    /// Target acceptance rate for componentwise proposals.
    pub target_accept: f64,
    /// Base RNG seed; each chain derives its own deterministic stream.
    pub seed: u64,
    /// Convergence gate: any parameter with split R-hat above this fails the fit.
    pub max_rhat: f64,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        SamplerSettings {
            draws: 2000,
            tune: 1000,
            chains: 4,
            target_accept: 0.44,
            seed: 42,
            max_rhat: 1.1,
        }
    }
}

impl SamplerSettings {
    /// Validate settings before any sampling work starts.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.draws == 0 {
            return Err(ModelError::configuration("Sampler draws must be > 0."));
        }
        if self.chains == 0 {
            return Err(ModelError::configuration("Sampler chains must be > 0."));
        }
        if !(self.target_accept > 0.0 && self.target_accept < 1.0) {
            return Err(ModelError::configuration(format!(
                "Target acceptance must be in (0, 1), got {}.",
                self.target_accept
            )));
        }
        if !(self.max_rhat.is_finite() && self.max_rhat >= 1.0) {
            return Err(ModelError::configuration(format!(
                "Max R-hat must be finite and >= 1, got {}.",
                self.max_rhat
            )));
        }
        Ok(())
    }
}

/// Posterior summary for a single parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParamSummary {
    pub mean: f64,
    pub sd: f64,
    pub hdi_low: f64,
    pub hdi_high: f64,
    pub rhat: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Root data directory; group data lives at `<root>/<class>/<order>/<species>/`.
    pub data_dir: PathBuf,
    pub data_file: String,

    pub class_name: String,
    pub order: String,
    pub species: String,

    pub sex: Option<String>,
    pub location: Option<String>,
    /// Inclusive `[lower, upper]` year filter; `None` skips the filter.
    pub year_interval: Option<[i32; 2]>,

    pub response_var: String,
    pub explanatory_var: String,

    pub model_type: ModelType,
    pub curve: CurveKind,
    pub priors: PriorConfig,
    pub sampler: SamplerSettings,
    pub hdi_prob: f64,

    pub export_report: Option<PathBuf>,
    pub export_preds: Option<PathBuf>,
}
