//! Serializable result models.
//!
//! Every result kind shares one capability: conversion to a dictionary
//! (`to_dict`) and to YAML (`to_yaml`). Rather than a base class, the
//! capability is a trait whose default methods ride on serde, so each
//! concrete kind only describes its fields.
//!
//! Instances are built once, after fitting completes, and never mutated;
//! serialization is read-only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ClassMetadata, CurveKind, ModelType, ParamSummary, SamplerSettings};
use crate::error::ModelError;

/// Dictionary form shared by every result model.
pub type Dict = serde_json::Map<String, Value>;

/// Shared serialization capability for result models.
pub trait DataModel: Serialize {
    /// Convert the model to a dictionary.
    fn to_dict(&self) -> Result<Dict, ModelError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(ModelError::configuration(format!(
                "Result model did not serialize to a mapping (got {other:?})."
            ))),
            Err(e) => Err(ModelError::configuration(format!(
                "Failed to serialize result model: {e}"
            ))),
        }
    }

    /// Convert the model to a YAML document.
    fn to_yaml(&self) -> Result<String, ModelError> {
        serde_yaml::to_string(self)
            .map_err(|e| ModelError::configuration(format!("Failed to render YAML: {e}")))
    }
}

/// Bayesian sampling metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayesianMeta {
    pub model_type: String,
    pub sampler_longname: String,
    pub sampler: String,
    pub n_draws: usize,
    pub n_burn: usize,
    pub acceptance_prob: f64,
    pub n_chains: usize,
    pub parallelisation: bool,
}

impl BayesianMeta {
    /// Describe a concrete run from its model type and sampler settings.
    pub fn from_settings(model_type: ModelType, settings: &SamplerSettings) -> Self {
        BayesianMeta {
            model_type: model_type.as_str().to_string(),
            sampler_longname: "Adaptive Random-Walk Metropolis".to_string(),
            sampler: "rwm".to_string(),
            n_draws: settings.draws,
            n_burn: settings.tune,
            acceptance_prob: settings.target_accept,
            n_chains: settings.chains,
            parallelisation: true,
        }
    }
}

impl Default for BayesianMeta {
    fn default() -> Self {
        BayesianMeta::from_settings(ModelType::Linear, &SamplerSettings::default())
    }
}

impl DataModel for BayesianMeta {}

/// Fisheries study metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FisheriesMeta {
    #[serde(rename = "class")]
    pub class_name: String,
    pub order: String,
    pub species: String,
    pub data_source: String,
    pub sex: String,
    pub locations: Vec<String>,
    pub years: Vec<i32>,
    pub response_var: String,
    pub response_unit: String,
    pub explanatory_var: String,
    pub explanatory_unit: String,
}

impl Default for FisheriesMeta {
    fn default() -> Self {
        FisheriesMeta {
            class_name: "chondrichthyes".to_string(),
            order: "carcharhiniformes".to_string(),
            species: "carcharhinus_limbatus".to_string(),
            data_source: String::new(),
            sex: "female".to_string(),
            locations: Vec::new(),
            years: Vec::new(),
            response_var: "fl".to_string(),
            response_unit: "cm".to_string(),
            explanatory_var: "age".to_string(),
            explanatory_unit: "years".to_string(),
        }
    }
}

impl DataModel for FisheriesMeta {}

/// Behaviour-test scenario metadata: the nested models plus data location.
///
/// Serializes as nested dictionaries (each nested model becomes its own
/// mapping), matching how scenario files are consumed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviourTestMeta {
    pub bayesian: BayesianMeta,
    pub fisheries: FisheriesMeta,
    pub data_dir: String,
    pub data_file: String,
}

impl DataModel for BehaviourTestMeta {}

/// Experiment metadata (name, tags, logged parameters).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentMeta {
    pub experiment_name: String,
    pub tags: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
}

impl Default for ExperimentMeta {
    fn default() -> Self {
        ExperimentMeta {
            experiment_name: "fit_growth_curves".to_string(),
            tags: BTreeMap::new(),
            params: BTreeMap::new(),
        }
    }
}

impl DataModel for ExperimentMeta {}

/// The per-group fit result dictionary handed to serialization collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitReport {
    pub model_type: ModelType,
    /// Curve variant for nonlinear fits; absent for linear models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<CurveKind>,
    pub group: ClassMetadata,
    pub n_obs: usize,
    pub hdi_prob: f64,
    pub sampler: SamplerSettings,
    /// Parameter name -> posterior summary (mean, sd, HDI bounds, R-hat).
    pub params: BTreeMap<String, ParamSummary>,
}

impl DataModel for FitReport {}
