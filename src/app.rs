//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves them into a `FitConfig`
//! - runs the select -> fit -> predict pipeline
//! - prints the posterior summary
//! - writes optional exports

use clap::Parser;

use crate::cli::{Cli, Command, FitArgs};
use crate::domain::FitConfig;
use crate::error::ModelError;
use crate::keys::parse_comma_list;

pub mod pipeline;

/// Entry point for the `growth` binary.
pub fn run() -> Result<(), ModelError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Fit(args) => handle_fit(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), ModelError> {
    let config = fit_config_from_args(&args)?;
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_fit_summary(&run.report, &config)
    );

    if let Some(path) = &config.export_report {
        crate::io::write_report_yaml(path, &run.report)?;
    }
    if let Some(path) = &config.export_preds {
        crate::io::write_predictive_csv(path, &run.selection.x, &run.band)?;
    }

    Ok(())
}

/// Resolve CLI flags into a validated pipeline configuration.
pub fn fit_config_from_args(args: &FitArgs) -> Result<FitConfig, ModelError> {
    let year_interval = match &args.years {
        Some(text) => Some(parse_year_interval(text)?),
        None => None,
    };

    let sampler = crate::domain::SamplerSettings {
        draws: args.draws,
        tune: args.tune,
        chains: args.chains,
        seed: args.seed,
        ..crate::domain::SamplerSettings::default()
    };
    sampler.validate()?;

    if !(args.hdi_prob > 0.0 && args.hdi_prob <= 1.0) {
        return Err(ModelError::configuration(format!(
            "HDI probability must be in (0, 1], got {}.",
            args.hdi_prob
        )));
    }

    Ok(FitConfig {
        data_dir: args.data_dir.clone(),
        data_file: args.data_file.clone(),
        class_name: args.class_name.clone(),
        order: args.order.clone(),
        species: args.species.clone(),
        sex: args.sex.clone(),
        location: args.location.clone(),
        year_interval,
        response_var: args.response.clone(),
        explanatory_var: args.explanatory.clone(),
        model_type: args.model,
        curve: args.curve,
        priors: crate::domain::PriorConfig::default(),
        sampler,
        hdi_prob: args.hdi_prob,
        export_report: args.export_report.clone(),
        export_preds: args.export_preds.clone(),
    })
}

/// Parse an inclusive year interval from a comma list ("2010, 2015").
fn parse_year_interval(text: &str) -> Result<[i32; 2], ModelError> {
    let tokens = parse_comma_list(text);
    if tokens.len() != 2 {
        return Err(ModelError::configuration(format!(
            "Year interval must be two comma-separated years, got {} token(s) in '{text}'.",
            tokens.len()
        )));
    }

    let mut years = [0i32; 2];
    for (slot, token) in years.iter_mut().zip(tokens.iter()) {
        *slot = token.parse::<i32>().map_err(|_| {
            ModelError::configuration(format!("Invalid year '{token}' in interval '{text}'."))
        })?;
    }

    if years[0] > years[1] {
        return Err(ModelError::configuration(format!(
            "Year interval lower bound {} exceeds upper bound {}.",
            years[0], years[1]
        )));
    }
    Ok(years)
}
