//! Von Bertalanffy growth curves (monophasic and biphasic).
//!
//! The fitter and the posterior predictor rely on two primitive operations:
//! - evaluate size-at-age for a single age (likelihood loops)
//! - evaluate a whole age slice (predictive curves)
//!
//! Numerical notes:
//! - `1 - exp(-x)` is computed via `exp_m1` so `vbgm` is exactly 0 at
//!   `t = t0` and keeps precision for small `k * (t - t0)`.
//! - Ages below `t0` yield negative sizes; that is left to the caller to
//!   interpret (the curve crosses zero at `t0` by construction).

/// Gain of the logistic activation for the biphasic secondary phase,
/// in units of 1/year. Controls how sharply the second phase switches on
/// around `th` while keeping the curve differentiable there.
const PHASE_GAIN: f64 = 2.0;

/// Monophasic von Bertalanffy parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonophasicParams {
    /// Asymptotic size.
    pub linf: f64,
    /// Growth rate.
    pub k: f64,
    /// Theoretical age at size zero.
    pub t0: f64,
}

/// Biphasic von Bertalanffy parameters.
///
/// Only meaningful jointly with the biphasic curve; `h`/`th` have no
/// interpretation under the monophasic variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiphasicParams {
    pub linf: f64,
    pub k: f64,
    pub t0: f64,
    /// Magnitude of the secondary growth phase.
    pub h: f64,
    /// Age at which the secondary phase activates.
    pub th: f64,
}

/// Monophasic von Bertalanffy size at age `t`:
/// `linf * (1 - exp(-k * (t - t0)))`.
pub fn vbgm(linf: f64, k: f64, t0: f64, t: f64) -> f64 {
    -linf * (-k * (t - t0)).exp_m1()
}

/// Biphasic von Bertalanffy size at age `t`.
///
/// Monophasic base plus a smooth secondary term: ~0 for `t` far below `th`,
/// approaching magnitude `h` for `t` far above `th`. The transition is a
/// logistic in `t - th`, continuous and strictly monotone.
pub fn bvbgm(linf: f64, k: f64, t0: f64, h: f64, th: f64, t: f64) -> f64 {
    vbgm(linf, k, t0, t) + h * phase_activation(t, th)
}

/// Logistic activation of the secondary phase, in `[0, 1]`.
fn phase_activation(t: f64, th: f64) -> f64 {
    1.0 / (1.0 + (-PHASE_GAIN * (t - th)).exp())
}

/// Evaluate the monophasic curve over an age slice.
///
/// Element-wise over ages of arbitrary length (empty in, empty out); the
/// input slice is never mutated.
pub fn vbgm_curve(params: &MonophasicParams, ages: &[f64]) -> Vec<f64> {
    ages.iter()
        .map(|&t| vbgm(params.linf, params.k, params.t0, t))
        .collect()
}

/// Evaluate the biphasic curve over an age slice.
pub fn bvbgm_curve(params: &BiphasicParams, ages: &[f64]) -> Vec<f64> {
    ages.iter()
        .map(|&t| bvbgm(params.linf, params.k, params.t0, params.h, params.th, t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vbgm_is_zero_at_t0() {
        for &t0 in &[-2.0, -1.0, 0.0, 1.5] {
            let v = vbgm(150.0, 0.3, t0, t0);
            assert!(v.abs() < 1e-12, "vbgm at t0 should be 0, got {v}");
        }
    }

    #[test]
    fn vbgm_negative_below_t0() {
        // The curve crosses zero at t0; earlier ages are negative and are
        // returned as-is.
        assert!(vbgm(150.0, 0.3, -1.0, -3.0) < 0.0);
    }

    #[test]
    fn vbgm_approaches_linf() {
        let v = vbgm(150.0, 0.3, -1.0, 80.0);
        assert!((v - 150.0).abs() < 1e-6);
    }

    #[test]
    fn bvbgm_collapses_to_vbgm_as_h_vanishes() {
        for &th in &[0.0, 5.0, 12.0] {
            for &t in &[0.0, 2.0, 8.0, 20.0] {
                let mono = vbgm(150.0, 0.3, -1.0, t);
                assert_eq!(bvbgm(150.0, 0.3, -1.0, 0.0, th, t), mono);
                let tiny = bvbgm(150.0, 0.3, -1.0, 1e-12, th, t);
                assert!((tiny - mono).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn phase_activation_asymptotes() {
        assert!(phase_activation(-100.0, 10.0) < 1e-12);
        assert!((phase_activation(200.0, 10.0) - 1.0).abs() < 1e-12);
        // Monotone through the transition.
        let lo = phase_activation(9.0, 10.0);
        let mid = phase_activation(10.0, 10.0);
        let hi = phase_activation(11.0, 10.0);
        assert!(lo < mid && mid < hi);
    }

    #[test]
    fn curve_slices_preserve_length() {
        let mono = MonophasicParams {
            linf: 150.0,
            k: 0.3,
            t0: -1.0,
        };
        let ages = [0.0, 1.0, 2.0, 10.0];
        assert_eq!(vbgm_curve(&mono, &ages).len(), ages.len());
        assert!(vbgm_curve(&mono, &[]).is_empty());

        let bi = BiphasicParams {
            linf: 150.0,
            k: 0.3,
            t0: -1.0,
            h: 20.0,
            th: 8.0,
        };
        assert_eq!(bvbgm_curve(&bi, &ages).len(), ages.len());
        assert!(bvbgm_curve(&bi, &[]).is_empty());
    }
}
