//! Command-line parsing for the growth-curve fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the modelling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{CurveKind, ModelType};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "growth",
    version,
    about = "Bayesian growth-curve fitting for fisheries age/size data"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a growth model to one species/sex/location slice, print the
    /// posterior summary, and optionally export the report and band.
    Fit(FitArgs),
}

/// Options for fitting one group.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Root data directory (group data lives at <dir>/<class>/<order>/<species>/).
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Data file name inside the group directory.
    #[arg(long, default_value = "data.csv")]
    pub data_file: String,

    /// Taxonomic class.
    #[arg(long = "class", default_value = "chondrichthyes")]
    pub class_name: String,

    /// Taxonomic order.
    #[arg(long, default_value = "carcharhiniformes")]
    pub order: String,

    /// Species (directory name or display name; snake-cased for paths).
    #[arg(long, default_value = "carcharhinus_limbatus")]
    pub species: String,

    /// Exact sex filter (e.g. "f"); omit to use all rows.
    #[arg(long)]
    pub sex: Option<String>,

    /// Exact location filter; omit to use all rows.
    #[arg(long)]
    pub location: Option<String>,

    /// Inclusive year interval as a comma list, e.g. "2010, 2015".
    #[arg(long)]
    pub years: Option<String>,

    /// Response column (size metric).
    #[arg(long, default_value = "fl")]
    pub response: String,

    /// Explanatory column (age).
    #[arg(long, default_value = "age")]
    pub explanatory: String,

    /// Which regression model to fit.
    #[arg(long, value_enum, default_value_t = ModelType::GrowthCurve)]
    pub model: ModelType,

    /// Growth-curve variant for nonlinear fits.
    #[arg(long, value_enum, default_value_t = CurveKind::Monophasic)]
    pub curve: CurveKind,

    /// Retained posterior draws per chain.
    #[arg(long, default_value_t = 2000)]
    pub draws: usize,

    /// Tuning (burn-in) steps per chain.
    #[arg(long, default_value_t = 1000)]
    pub tune: usize,

    /// Number of MCMC chains.
    #[arg(long, default_value_t = 4)]
    pub chains: usize,

    /// Base RNG seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// HDI probability mass for summaries and predictive bands.
    #[arg(long, default_value_t = 0.95)]
    pub hdi_prob: f64,

    /// Write the fit report to this YAML file.
    #[arg(long)]
    pub export_report: Option<PathBuf>,

    /// Write the posterior-predictive band to this CSV file.
    #[arg(long)]
    pub export_preds: Option<PathBuf>,
}
