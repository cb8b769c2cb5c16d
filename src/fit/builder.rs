//! Probabilistic model construction and fit dispatch.
//!
//! `fit_model` is the single entry point: it validates the observation
//! arrays, dispatches on the model type (an exhaustive enum match, so an
//! unknown type cannot reach sampling), builds the prior + likelihood
//! log-density and hands it to the sampling engine. Convergence diagnostics
//! from the engine gate the returned trace.

use crate::domain::{CurveKind, ModelType, PriorConfig, SamplerSettings};
use crate::error::ModelError;
use crate::fit::sampler::{LogDensity, sample_posterior};
use crate::math::{fit_line, half_normal_logpdf, normal_logpdf, sd};
use crate::models::{bvbgm, vbgm};
use crate::posterior::PosteriorTrace;

/// Fit a model to aligned covariate/response arrays.
///
/// Dispatches to [`fit_linear_model`] or [`fit_nonlinear_model`]; `curve`
/// selects the nonlinear variant and is ignored for linear fits.
pub fn fit_model(
    x: &[f64],
    y: &[f64],
    model_type: ModelType,
    curve: CurveKind,
    priors: &PriorConfig,
    settings: &SamplerSettings,
) -> Result<PosteriorTrace, ModelError> {
    match model_type {
        ModelType::Linear => fit_linear_model(x, y, priors, settings),
        ModelType::GrowthCurve => fit_nonlinear_model(x, y, curve, priors, settings),
    }
}

/// Bayesian linear regression: `y ~ Normal(intercept + slope * x, sigma)`.
pub fn fit_linear_model(
    x: &[f64],
    y: &[f64],
    priors: &PriorConfig,
    settings: &SamplerSettings,
) -> Result<PosteriorTrace, ModelError> {
    validate_observations(x, y)?;
    let model = LinearModel {
        x,
        y,
        priors: *priors,
    };
    let trace = sample_posterior(&model, settings)?;
    trace.check_convergence(settings.max_rhat)?;
    Ok(trace)
}

/// Bayesian nonlinear regression with a growth-curve mean function.
///
/// Independent priors per curve parameter, Gaussian observation noise with a
/// half-Normal prior on its scale. Sampling cost dominates; draw/tune/chain
/// counts come from `settings`, never from constants here.
pub fn fit_nonlinear_model(
    x: &[f64],
    y: &[f64],
    curve: CurveKind,
    priors: &PriorConfig,
    settings: &SamplerSettings,
) -> Result<PosteriorTrace, ModelError> {
    validate_observations(x, y)?;
    let model = GrowthCurveModel {
        x,
        y,
        curve,
        priors: *priors,
    };
    let trace = sample_posterior(&model, settings)?;
    trace.check_convergence(settings.max_rhat)?;
    Ok(trace)
}

/// Reject empty, misaligned or non-finite observation arrays before any
/// sampling work starts.
fn validate_observations(x: &[f64], y: &[f64]) -> Result<(), ModelError> {
    if x.len() != y.len() {
        return Err(ModelError::data(format!(
            "Covariate and response lengths differ ({} vs {}).",
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(ModelError::data(
            "No observations to fit (the filtered dataset is empty).",
        ));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(ModelError::data(
            "Observations contain non-finite values.",
        ));
    }
    Ok(())
}

/// Noise floor for initial sigma estimates.
const SIGMA_INIT_MIN: f64 = 1e-3;

struct LinearModel<'a> {
    x: &'a [f64],
    y: &'a [f64],
    priors: PriorConfig,
}

impl LogDensity for LinearModel<'_> {
    fn dim(&self) -> usize {
        3
    }

    fn parameter_names(&self) -> Vec<String> {
        vec!["intercept".into(), "slope".into(), "sigma".into()]
    }

    fn initial_position(&self) -> Vec<f64> {
        let (a, b) = fit_line(self.x, self.y).unwrap_or((0.0, 0.0));
        let residuals: Vec<f64> = self
            .x
            .iter()
            .zip(self.y.iter())
            .map(|(&xi, &yi)| yi - (a + b * xi))
            .collect();
        vec![a, b, sd(&residuals).max(SIGMA_INIT_MIN)]
    }

    fn log_density(&self, p: &[f64]) -> f64 {
        let (intercept, slope, sigma) = (p[0], p[1], p[2]);
        if sigma <= 0.0 {
            return f64::NEG_INFINITY;
        }

        let mut lp = normal_logpdf(intercept, self.priors.intercept.mean, self.priors.intercept.sd)
            + normal_logpdf(slope, self.priors.slope.mean, self.priors.slope.sd)
            + half_normal_logpdf(sigma, self.priors.sigma.sd);

        for (&xi, &yi) in self.x.iter().zip(self.y.iter()) {
            lp += normal_logpdf(yi, intercept + slope * xi, sigma);
        }
        lp
    }
}

struct GrowthCurveModel<'a> {
    x: &'a [f64],
    y: &'a [f64],
    curve: CurveKind,
    priors: PriorConfig,
}

impl GrowthCurveModel<'_> {
    /// Data-driven starting point: asymptote just above the largest observed
    /// size, a moderate growth rate, phase age at the covariate midpoint.
    fn initial_curve_params(&self) -> Vec<f64> {
        let y_max = self.y.iter().copied().fold(f64::MIN, f64::max);
        let linf0 = (y_max * 1.05).max(1.0);
        let x_mid = crate::math::mean(self.x);
        match self.curve {
            CurveKind::Monophasic => vec![linf0, 0.3, 0.0],
            CurveKind::Biphasic => vec![linf0, 0.3, 0.0, 1.0, x_mid.max(1.0)],
        }
    }

    fn mean_at(&self, p: &[f64], t: f64) -> f64 {
        match self.curve {
            CurveKind::Monophasic => vbgm(p[0], p[1], p[2], t),
            CurveKind::Biphasic => bvbgm(p[0], p[1], p[2], p[3], p[4], t),
        }
    }
}

impl LogDensity for GrowthCurveModel<'_> {
    fn dim(&self) -> usize {
        self.curve.parameter_names().len() + 1
    }

    fn parameter_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .curve
            .parameter_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        names.push("sigma".into());
        names
    }

    fn initial_position(&self) -> Vec<f64> {
        let mut position = self.initial_curve_params();
        let residuals: Vec<f64> = self
            .x
            .iter()
            .zip(self.y.iter())
            .map(|(&t, &yi)| yi - self.mean_at(&position, t))
            .collect();
        position.push(sd(&residuals).max(SIGMA_INIT_MIN));
        position
    }

    fn log_density(&self, p: &[f64]) -> f64 {
        let pr = &self.priors;
        let sigma = p[p.len() - 1];

        // Support constraints: positive asymptote, growth rate and noise
        // scale; the biphasic phase age must also be positive. Normal priors
        // over these are effectively truncated at zero.
        if sigma <= 0.0 || p[0] <= 0.0 || p[1] <= 0.0 {
            return f64::NEG_INFINITY;
        }

        let mut lp = normal_logpdf(p[0], pr.linf.mean, pr.linf.sd)
            + normal_logpdf(p[1], pr.k.mean, pr.k.sd)
            + normal_logpdf(p[2], pr.t0.mean, pr.t0.sd)
            + half_normal_logpdf(sigma, pr.sigma.sd);

        if self.curve == CurveKind::Biphasic {
            if p[4] <= 0.0 {
                return f64::NEG_INFINITY;
            }
            lp += normal_logpdf(p[3], pr.h.mean, pr.h.sd)
                + normal_logpdf(p[4], pr.th.mean, pr.th.sd);
        }

        for (&t, &yi) in self.x.iter().zip(self.y.iter()) {
            lp += normal_logpdf(yi, self.mean_at(p, t), sigma);
        }
        lp
    }
}
