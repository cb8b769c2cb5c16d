//! Scalar statistics over posterior draws.
//!
//! - minimum-width highest-density intervals (not equal-tailed quantiles)
//! - split R-hat for convergence gating
//! - Normal / half-Normal log-densities used by the model builders

use std::f64::consts::PI;

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n-1 denominator); 0 for fewer than two values.
pub fn sd(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Highest-density interval at probability mass `prob`.
///
/// Uses the minimum-width definition: among all windows of
/// `ceil(prob * n)` consecutive sorted draws, the narrowest one.
/// Returns `None` for an empty slice.
pub fn hdi(draws: &[f64], prob: f64) -> Option<(f64, f64)> {
    if draws.is_empty() {
        return None;
    }

    let mut sorted: Vec<f64> = draws.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let m = ((prob * n as f64).ceil() as usize).clamp(1, n);

    let mut best = (sorted[0], sorted[m - 1]);
    let mut best_width = best.1 - best.0;
    for i in 1..=(n - m) {
        let width = sorted[i + m - 1] - sorted[i];
        if width < best_width {
            best_width = width;
            best = (sorted[i], sorted[i + m - 1]);
        }
    }
    Some(best)
}

/// Split R-hat over per-chain draw vectors.
///
/// Each chain is split in half; the statistic compares within-sequence and
/// between-sequence variance. Values near 1 indicate the chains mixed.
/// Degenerate inputs (constant chains, too few draws) return a non-finite
/// value so convergence gates trip rather than pass silently.
pub fn split_rhat(chains: &[Vec<f64>]) -> f64 {
    if chains.is_empty() {
        return f64::NAN;
    }
    let n = chains.iter().map(Vec::len).min().unwrap_or(0);
    let half = n / 2;
    if half < 2 {
        return f64::NAN;
    }

    // Split each chain into two sequences of equal length.
    let mut seq_means = Vec::with_capacity(chains.len() * 2);
    let mut seq_vars = Vec::with_capacity(chains.len() * 2);
    for chain in chains {
        for seq in [&chain[..half], &chain[half..2 * half]] {
            let m = mean(seq);
            let s = sd(seq);
            seq_means.push(m);
            seq_vars.push(s * s);
        }
    }

    let w = mean(&seq_vars);
    let mean_var = sd(&seq_means);
    let b = half as f64 * mean_var * mean_var;

    if w <= 0.0 {
        // All sequences constant: either a stuck sampler (b > 0) or a fully
        // degenerate posterior (b == 0). Both must fail the gate.
        return f64::INFINITY;
    }

    let var_plus = (half as f64 - 1.0) / half as f64 * w + b / half as f64;
    (var_plus / w).sqrt()
}

/// Log-density of `Normal(mean, sd)` at `x`.
pub fn normal_logpdf(x: f64, mean: f64, sd: f64) -> f64 {
    let z = (x - mean) / sd;
    -0.5 * (2.0 * PI).ln() - sd.ln() - 0.5 * z * z
}

/// Log-density of `HalfNormal(sd)` at `x`; `-inf` outside the support.
pub fn half_normal_logpdf(x: f64, sd: f64) -> f64 {
    if x < 0.0 {
        return f64::NEG_INFINITY;
    }
    std::f64::consts::LN_2 + normal_logpdf(x, 0.0, sd)
}
