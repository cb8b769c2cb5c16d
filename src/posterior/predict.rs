//! Posterior-predictive computation.
//!
//! `get_mu_pp` propagates every retained posterior draw through the model's
//! mean function at the *observed* covariates, producing a distribution of
//! predicted means aligned index-for-index with the input. `predictive_band`
//! reduces that distribution to the mean curve plus per-covariate HDI bounds,
//! which is exactly the data a plotting front-end needs.

use crate::domain::{CurveKind, ModelType};
use crate::error::ModelError;
use crate::math::{hdi, mean};
use crate::models::{bvbgm, vbgm};
use crate::posterior::trace::PosteriorTrace;

/// Distribution of predicted means: one row per retained draw, one column
/// per observed covariate.
#[derive(Debug, Clone)]
pub struct MuPredictive {
    values: Vec<Vec<f64>>,
    n_obs: usize,
}

impl MuPredictive {
    pub fn n_draws(&self) -> usize {
        self.values.len()
    }

    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    /// Predicted means for one draw, aligned with the input covariates.
    pub fn draw(&self, index: usize) -> Option<&[f64]> {
        self.values.get(index).map(Vec::as_slice)
    }

    /// Pointwise mean over draws, aligned with the input covariates.
    pub fn mean_curve(&self) -> Vec<f64> {
        (0..self.n_obs)
            .map(|i| {
                let column: Vec<f64> = self.values.iter().map(|row| row[i]).collect();
                mean(&column)
            })
            .collect()
    }
}

/// Predictive mean curve plus HDI bounds, indexed like the input covariates.
#[derive(Debug, Clone)]
pub struct PredictiveBand {
    pub mean: Vec<f64>,
    pub hdi_low: Vec<f64>,
    pub hdi_high: Vec<f64>,
    pub hdi_prob: f64,
}

/// Compute the posterior-predictive mean distribution at `x`.
///
/// Parameter names may be stored bare (`"k"`) or qualified by a group key
/// (`"k::<group>"`); pass `group` to resolve the latter. Output rows are
/// always `x.len()` long, including for empty `x`.
pub fn get_mu_pp(
    trace: &PosteriorTrace,
    model_type: ModelType,
    curve: CurveKind,
    x: &[f64],
    group: Option<&str>,
) -> Result<MuPredictive, ModelError> {
    let names: &[&str] = match model_type {
        ModelType::Linear => &["intercept", "slope"],
        ModelType::GrowthCurve => curve.parameter_names(),
    };

    let mut draws_by_param = Vec::with_capacity(names.len());
    for name in names {
        let draws = trace.lookup(name, group).ok_or_else(|| {
            ModelError::data(format!(
                "Trace has no parameter '{name}' (bare or group-qualified)."
            ))
        })?;
        draws_by_param.push(draws);
    }

    let n_draws = draws_by_param[0].len();
    let mut values = Vec::with_capacity(n_draws);
    for d in 0..n_draws {
        let p: Vec<f64> = draws_by_param.iter().map(|draws| draws[d]).collect();
        let row: Vec<f64> = match model_type {
            ModelType::Linear => x.iter().map(|&xi| p[0] + p[1] * xi).collect(),
            ModelType::GrowthCurve => match curve {
                CurveKind::Monophasic => x.iter().map(|&t| vbgm(p[0], p[1], p[2], t)).collect(),
                CurveKind::Biphasic => x
                    .iter()
                    .map(|&t| bvbgm(p[0], p[1], p[2], p[3], p[4], t))
                    .collect(),
            },
        };
        values.push(row);
    }

    Ok(MuPredictive {
        values,
        n_obs: x.len(),
    })
}

/// Reduce a predictive distribution to mean + HDI bounds per covariate.
pub fn predictive_band(mu: &MuPredictive, hdi_prob: f64) -> Result<PredictiveBand, ModelError> {
    if !(hdi_prob > 0.0 && hdi_prob <= 1.0) {
        return Err(ModelError::configuration(format!(
            "HDI probability must be in (0, 1], got {hdi_prob}."
        )));
    }

    let mut mean_curve = Vec::with_capacity(mu.n_obs);
    let mut hdi_low = Vec::with_capacity(mu.n_obs);
    let mut hdi_high = Vec::with_capacity(mu.n_obs);

    for i in 0..mu.n_obs {
        let column: Vec<f64> = mu.values.iter().map(|row| row[i]).collect();
        let (lo, hi) = hdi(&column, hdi_prob)
            .ok_or_else(|| ModelError::sampling("Predictive distribution has no draws."))?;
        mean_curve.push(mean(&column));
        hdi_low.push(lo);
        hdi_high.push(hi);
    }

    Ok(PredictiveBand {
        mean: mean_curve,
        hdi_low,
        hdi_high,
        hdi_prob,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ClassMetadata;
    use std::collections::BTreeMap;

    fn linear_trace() -> PosteriorTrace {
        let mut params = BTreeMap::new();
        params.insert("intercept".to_string(), vec![vec![1.0, 1.0], vec![1.0, 1.0]]);
        params.insert("slope".to_string(), vec![vec![2.0, 2.0], vec![2.0, 2.0]]);
        params.insert("sigma".to_string(), vec![vec![0.5, 0.5], vec![0.5, 0.5]]);
        PosteriorTrace::from_parameter_chains(params, vec![0.4, 0.4]).unwrap()
    }

    fn mono_trace() -> PosteriorTrace {
        let mut params = BTreeMap::new();
        params.insert("linf".to_string(), vec![vec![150.0, 150.0]]);
        params.insert("k".to_string(), vec![vec![0.3, 0.3]]);
        params.insert("t0".to_string(), vec![vec![-1.0, -1.0]]);
        PosteriorTrace::from_parameter_chains(params, vec![0.4]).unwrap()
    }

    #[test]
    fn mu_pp_rows_match_covariate_length() {
        let trace = linear_trace();
        for x in [vec![], vec![1.0], vec![0.0, 1.0, 2.0]] {
            let mu = get_mu_pp(&trace, ModelType::Linear, CurveKind::Monophasic, &x, None).unwrap();
            assert_eq!(mu.n_obs(), x.len());
            for d in 0..mu.n_draws() {
                assert_eq!(mu.draw(d).unwrap().len(), x.len());
            }
        }
    }

    #[test]
    fn mu_pp_evaluates_the_linear_mean() {
        let trace = linear_trace();
        let mu = get_mu_pp(
            &trace,
            ModelType::Linear,
            CurveKind::Monophasic,
            &[0.0, 2.0],
            None,
        )
        .unwrap();
        assert_eq!(mu.mean_curve(), vec![1.0, 5.0]);
    }

    #[test]
    fn mu_pp_evaluates_the_growth_curve_mean() {
        let trace = mono_trace();
        let x = [0.0, 5.0, 20.0];
        let mu = get_mu_pp(&trace, ModelType::GrowthCurve, CurveKind::Monophasic, &x, None).unwrap();
        let expected: Vec<f64> = x.iter().map(|&t| vbgm(150.0, 0.3, -1.0, t)).collect();
        for (got, want) in mu.mean_curve().iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn mu_pp_resolves_group_qualified_parameters() {
        let meta = ClassMetadata::new("shark_a").with_sex("female");
        let trace = mono_trace().qualified(&meta);
        let group = meta.group_key();

        // Bare lookup must fail, qualified lookup must succeed.
        let err = get_mu_pp(
            &trace,
            ModelType::GrowthCurve,
            CurveKind::Monophasic,
            &[1.0],
            None,
        );
        assert!(err.is_err());

        let mu = get_mu_pp(
            &trace,
            ModelType::GrowthCurve,
            CurveKind::Monophasic,
            &[1.0, 2.0],
            Some(&group),
        )
        .unwrap();
        assert_eq!(mu.n_obs(), 2);
    }

    #[test]
    fn band_bounds_bracket_the_mean() {
        let mut params = BTreeMap::new();
        params.insert(
            "intercept".to_string(),
            vec![(0..100).map(|i| i as f64 * 0.01).collect::<Vec<f64>>()],
        );
        params.insert("slope".to_string(), vec![vec![1.0; 100]]);
        let trace = PosteriorTrace::from_parameter_chains(params, vec![0.4]).unwrap();

        let mu = get_mu_pp(&trace, ModelType::Linear, CurveKind::Monophasic, &[0.0, 3.0], None)
            .unwrap();
        let band = predictive_band(&mu, 0.9).unwrap();
        for i in 0..2 {
            assert!(band.hdi_low[i] <= band.mean[i]);
            assert!(band.mean[i] <= band.hdi_high[i]);
        }
        assert!(predictive_band(&mu, 0.0).is_err());
    }
}
