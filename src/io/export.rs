//! Export fit results for downstream consumers.
//!
//! - the fit report as a YAML document (spreadsheet-free metadata handoff)
//! - the posterior-predictive band as CSV, one row per observed covariate,
//!   easy to consume from plotting scripts

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::ModelError;
use crate::posterior::PredictiveBand;
use crate::report::results::{DataModel, FitReport};

/// Write the fit report as a YAML file.
pub fn write_report_yaml(path: &Path, report: &FitReport) -> Result<(), ModelError> {
    let yaml = report.to_yaml()?;
    std::fs::write(path, yaml).map_err(|e| {
        ModelError::data(format!(
            "Failed to write report YAML '{}': {e}",
            path.display()
        ))
    })
}

/// Write the posterior-predictive band to a CSV file.
///
/// Rows are emitted in covariate order, so the file indexes identically to
/// the observations that produced the band.
pub fn write_predictive_csv(
    path: &Path,
    x: &[f64],
    band: &PredictiveBand,
) -> Result<(), ModelError> {
    if x.len() != band.mean.len() {
        return Err(ModelError::configuration(format!(
            "Predictive band length {} does not match covariates {}.",
            band.mean.len(),
            x.len()
        )));
    }

    let mut file = File::create(path).map_err(|e| {
        ModelError::data(format!(
            "Failed to create predictive CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(file, "x,mu_mean,hdi_low,hdi_high")
        .map_err(|e| ModelError::data(format!("Failed to write predictive CSV header: {e}")))?;

    for i in 0..x.len() {
        writeln!(
            file,
            "{:.6},{:.6},{:.6},{:.6}",
            x[i], band.mean[i], band.hdi_low[i], band.hdi_high[i]
        )
        .map_err(|e| ModelError::data(format!("Failed to write predictive CSV row: {e}")))?;
    }

    Ok(())
}
