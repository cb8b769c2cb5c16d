//! Formatted terminal output for fit results.

use crate::domain::FitConfig;
use crate::report::results::FitReport;

/// Format the full run summary (group, model, posterior table).
pub fn format_fit_summary(report: &FitReport, config: &FitConfig) -> String {
    let mut out = String::new();

    out.push_str("=== growth - Bayesian growth-curve fit ===\n");
    out.push_str(&format!("Species:  {}\n", report.group.species));
    if let Some(sex) = &report.group.sex {
        out.push_str(&format!("Sex:      {sex}\n"));
    }
    if let Some(location) = &report.group.location {
        out.push_str(&format!("Location: {location}\n"));
    }
    if let Some([lower, upper]) = config.year_interval {
        out.push_str(&format!("Years:    {lower}-{upper}\n"));
    }

    match report.curve {
        Some(curve) => out.push_str(&format!(
            "Model:    {} ({})\n",
            report.model_type.as_str(),
            curve.display_name()
        )),
        None => out.push_str(&format!("Model:    {}\n", report.model_type.as_str())),
    }
    out.push_str(&format!(
        "Data:     n={} ({} ~ {})\n",
        report.n_obs, config.response_var, config.explanatory_var
    ));
    out.push_str(&format!(
        "Sampler:  {} chains x {} draws ({} tune)\n",
        report.sampler.chains, report.sampler.draws, report.sampler.tune
    ));

    let pct = report.hdi_prob * 100.0;
    out.push('\n');
    out.push_str(&format!(
        "{:<12} {:>12} {:>12} {:>12} {:>12} {:>8}\n",
        "parameter",
        "mean",
        "sd",
        format!("hdi_{pct:.0}%_lo"),
        format!("hdi_{pct:.0}%_hi"),
        "r_hat"
    ));
    for (name, s) in &report.params {
        out.push_str(&format!(
            "{:<12} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>8.3}\n",
            name, s.mean, s.sd, s.hdi_low, s.hdi_high, s.rhat
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ClassMetadata, CurveKind, ModelType, ParamSummary, PriorConfig, SamplerSettings,
    };
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn toy_report() -> FitReport {
        let mut params = BTreeMap::new();
        params.insert(
            "linf".to_string(),
            ParamSummary {
                mean: 150.2,
                sd: 2.1,
                hdi_low: 146.0,
                hdi_high: 154.3,
                rhat: 1.002,
            },
        );
        FitReport {
            model_type: ModelType::GrowthCurve,
            curve: Some(CurveKind::Monophasic),
            group: ClassMetadata::new("carcharhinus_limbatus").with_sex("female"),
            n_obs: 120,
            hdi_prob: 0.95,
            sampler: SamplerSettings::default(),
            params,
        }
    }

    fn toy_config() -> FitConfig {
        FitConfig {
            data_dir: PathBuf::from("data"),
            data_file: "data.csv".to_string(),
            class_name: "chondrichthyes".to_string(),
            order: "carcharhiniformes".to_string(),
            species: "carcharhinus_limbatus".to_string(),
            sex: Some("female".to_string()),
            location: None,
            year_interval: Some([2010, 2015]),
            response_var: "fl".to_string(),
            explanatory_var: "age".to_string(),
            model_type: ModelType::GrowthCurve,
            curve: CurveKind::Monophasic,
            priors: PriorConfig::default(),
            sampler: SamplerSettings::default(),
            hdi_prob: 0.95,
            export_report: None,
            export_preds: None,
        }
    }

    #[test]
    fn summary_includes_group_and_parameters() {
        let text = format_fit_summary(&toy_report(), &toy_config());
        assert!(text.contains("carcharhinus_limbatus"));
        assert!(text.contains("linf"));
        assert!(text.contains("2010-2015"));
        assert!(text.contains("hdi_95%_lo"));
    }
}
