//! Shared "fit pipeline" logic.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! data selection -> model fit -> posterior predictive -> report
//!
//! Front-ends (CLI today, batch runners tomorrow) then focus on
//! presentation and export.

use crate::data::{DataSelection, SelectorOptions, get_df};
use crate::domain::{ClassMetadata, FitConfig, ModelType};
use crate::error::ModelError;
use crate::fit::fit_model;
use crate::keys::get_dir_path;
use crate::posterior::{MuPredictive, PosteriorTrace, PredictiveBand, get_mu_pp, predictive_band};
use crate::report::results::FitReport;

/// All computed outputs of a single `growth fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub selection: DataSelection,
    pub trace: PosteriorTrace,
    pub mu: MuPredictive,
    pub band: PredictiveBand,
    pub report: FitReport,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, ModelError> {
    // 1) Resolve the group directory: <root>/<class>/<order>/<species>.
    let group_dir = get_dir_path(
        &get_dir_path(
            &get_dir_path(&config.data_dir, &config.class_name),
            &config.order,
        ),
        &config.species,
    );

    // 2) Select the observation slice. An empty selection is legal here;
    //    the fitter is what refuses zero rows.
    let selection = get_df(&group_dir, &config.data_file, &selector_options(config))?;

    // 3) Build and sample the model.
    let trace = fit_model(
        &selection.x,
        &selection.y,
        config.model_type,
        config.curve,
        &config.priors,
        &config.sampler,
    )?;

    // 4) Posterior predictive at the observed covariates.
    let mu = get_mu_pp(&trace, config.model_type, config.curve, &selection.x, None)?;
    let band = predictive_band(&mu, config.hdi_prob)?;

    // 5) Assemble the result dictionary.
    let group = group_metadata(config);
    let report = FitReport {
        model_type: config.model_type,
        curve: match config.model_type {
            ModelType::Linear => None,
            ModelType::GrowthCurve => Some(config.curve),
        },
        group,
        n_obs: selection.len(),
        hdi_prob: config.hdi_prob,
        sampler: config.sampler,
        params: trace.summary(config.hdi_prob)?,
    };

    Ok(RunOutput {
        selection,
        trace,
        mu,
        band,
        report,
    })
}

fn selector_options(config: &FitConfig) -> SelectorOptions {
    SelectorOptions {
        year_interval: config.year_interval,
        sex: config.sex.clone(),
        location: config.location.clone(),
        response_var: config.response_var.clone(),
        explanatory_var: config.explanatory_var.clone(),
        drop_na: true,
    }
}

fn group_metadata(config: &FitConfig) -> ClassMetadata {
    let mut meta = ClassMetadata::new(config.species.clone());
    if let Some(sex) = &config.sex {
        meta = meta.with_sex(sex.clone());
    }
    if let Some(location) = &config.location {
        meta = meta.with_location(location.clone());
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CurveKind, PriorConfig, SamplerSettings};
    use crate::models::vbgm;
    use std::path::PathBuf;

    /// Write a synthetic species table under a temp data root and return the
    /// root; layout matches <root>/<class>/<order>/<species>/data.csv.
    fn synthetic_data_root(tag: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "growth_curves_pipeline_{}_{tag}",
            std::process::id()
        ));
        let group_dir = root
            .join("chondrichthyes")
            .join("carcharhiniformes")
            .join("carcharhinus_limbatus");
        std::fs::create_dir_all(&group_dir).unwrap();

        let mut rows = String::from("age,fl,sex,location,year\n");
        for i in 0..80 {
            let age = 0.25 + i as f64 * 0.25;
            // Deterministic low-amplitude wobble stands in for noise.
            let fl = vbgm(150.0, 0.3, -1.0, age) + (i as f64 * 0.7).sin();
            rows.push_str(&format!("{age},{fl:.4},f,nsw,{}\n", 2005 + (i % 10)));
        }
        std::fs::write(group_dir.join("data.csv"), rows).unwrap();
        root
    }

    fn pipeline_config(root: PathBuf) -> FitConfig {
        FitConfig {
            data_dir: root,
            data_file: "data.csv".to_string(),
            class_name: "chondrichthyes".to_string(),
            order: "carcharhiniformes".to_string(),
            species: "carcharhinus_limbatus".to_string(),
            sex: Some("f".to_string()),
            location: Some("nsw".to_string()),
            year_interval: Some([2000, 2020]),
            response_var: "fl".to_string(),
            explanatory_var: "age".to_string(),
            model_type: crate::domain::ModelType::GrowthCurve,
            curve: CurveKind::Monophasic,
            priors: PriorConfig::default(),
            sampler: SamplerSettings {
                draws: 1500,
                tune: 1500,
                chains: 2,
                seed: 21,
                ..SamplerSettings::default()
            },
            hdi_prob: 0.95,
            export_report: None,
            export_preds: None,
        }
    }

    #[test]
    fn pipeline_runs_end_to_end() {
        let root = synthetic_data_root("e2e");
        let config = pipeline_config(root.clone());

        let run = run_fit(&config).unwrap();
        let _ = std::fs::remove_dir_all(&root);

        assert_eq!(run.selection.len(), 80);
        assert_eq!(run.band.mean.len(), run.selection.len());
        assert!(run.report.params.contains_key("linf"));
        assert!(run.report.params.contains_key("sigma"));

        // The predictive mean should track the generating curve closely.
        let linf = run.report.params["linf"].mean;
        assert!((linf - 150.0).abs() / 150.0 < 0.1, "linf off: {linf}");
    }

    #[test]
    fn pipeline_fails_cleanly_on_filtered_out_data() {
        let root = synthetic_data_root("empty");
        let mut config = pipeline_config(root.clone());
        config.year_interval = Some([1980, 1990]);

        let err = run_fit(&config).unwrap_err();
        let _ = std::fs::remove_dir_all(&root);
        // Empty selection is legal; fitting zero rows is the data error.
        assert_eq!(err.exit_code(), 3);
    }
}
