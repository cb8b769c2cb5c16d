//! Posterior trace storage.
//!
//! A trace maps each parameter name to its sampled values, ordered per chain
//! per draw. Invariants enforced here:
//!
//! - every parameter shares the same chain count and draw count
//! - keys within one trace are unique; merging group traces goes through
//!   group-qualified keys so distinct groups cannot collide

use std::collections::BTreeMap;

use crate::domain::{ClassMetadata, ParamSummary};
use crate::error::ModelError;
use crate::keys::get_trace_dict_key;
use crate::math::{hdi, mean, sd, split_rhat};

/// Posterior draws keyed by parameter name.
#[derive(Debug, Clone)]
pub struct PosteriorTrace {
    /// Parameter name -> per-chain draw vectors (`[chain][draw]`).
    params: BTreeMap<String, Vec<Vec<f64>>>,
    n_chains: usize,
    n_draws: usize,
    /// Mean post-tune acceptance rate per chain.
    accept_rates: Vec<f64>,
}

impl PosteriorTrace {
    /// Build a trace from per-parameter chain draws, validating shape.
    pub fn from_parameter_chains(
        params: BTreeMap<String, Vec<Vec<f64>>>,
        accept_rates: Vec<f64>,
    ) -> Result<Self, ModelError> {
        let mut shape: Option<(usize, usize)> = None;
        for (name, chains) in &params {
            let n_chains = chains.len();
            let n_draws = chains.first().map(Vec::len).unwrap_or(0);
            if chains.iter().any(|c| c.len() != n_draws) {
                return Err(ModelError::sampling(format!(
                    "Ragged chains for parameter '{name}'."
                )));
            }
            match shape {
                None => shape = Some((n_chains, n_draws)),
                Some(s) if s != (n_chains, n_draws) => {
                    return Err(ModelError::sampling(format!(
                        "Parameter '{name}' has {n_chains} chains x {n_draws} draws, expected {} x {}.",
                        s.0, s.1
                    )));
                }
                Some(_) => {}
            }
        }

        let (n_chains, n_draws) = shape.unwrap_or((0, 0));
        if n_chains == 0 || n_draws == 0 {
            return Err(ModelError::sampling("Empty posterior trace."));
        }

        Ok(PosteriorTrace {
            params,
            n_chains,
            n_draws,
            accept_rates,
        })
    }

    pub fn n_chains(&self) -> usize {
        self.n_chains
    }

    pub fn n_draws(&self) -> usize {
        self.n_draws
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.params.keys().map(String::as_str).collect()
    }

    pub fn accept_rates(&self) -> &[f64] {
        &self.accept_rates
    }

    /// Per-chain draws for an exactly named parameter.
    pub fn chains(&self, name: &str) -> Option<&Vec<Vec<f64>>> {
        self.params.get(name)
    }

    /// All draws for a parameter, chains concatenated in order.
    pub fn flattened(&self, name: &str) -> Option<Vec<f64>> {
        self.params
            .get(name)
            .map(|chains| chains.iter().flatten().copied().collect())
    }

    /// Resolve a parameter that may be stored bare (`"k"`) or qualified by a
    /// group key (`"k::<group>"`), returning its flattened draws.
    pub fn lookup(&self, name: &str, group_key: Option<&str>) -> Option<Vec<f64>> {
        if let Some(draws) = self.flattened(name) {
            return Some(draws);
        }
        let group_key = group_key?;
        self.flattened(&format!("{name}::{group_key}"))
    }

    /// Re-key every parameter with the group identity so traces from several
    /// groups can be merged into one shared mapping.
    pub fn qualified(&self, meta: &ClassMetadata) -> PosteriorTrace {
        let params = self
            .params
            .iter()
            .map(|(name, chains)| (get_trace_dict_key(name, meta), chains.clone()))
            .collect();
        PosteriorTrace {
            params,
            n_chains: self.n_chains,
            n_draws: self.n_draws,
            accept_rates: self.accept_rates.clone(),
        }
    }

    /// Merge another trace into this one.
    ///
    /// Both traces must share draw/chain counts, and keys must not collide;
    /// use [`PosteriorTrace::qualified`] before merging group traces.
    pub fn merge(&mut self, other: PosteriorTrace) -> Result<(), ModelError> {
        if (other.n_chains, other.n_draws) != (self.n_chains, self.n_draws) {
            return Err(ModelError::data(format!(
                "Cannot merge traces with different shapes ({}x{} vs {}x{}).",
                self.n_chains, self.n_draws, other.n_chains, other.n_draws
            )));
        }
        for (name, chains) in other.params {
            if self.params.contains_key(&name) {
                return Err(ModelError::configuration(format!(
                    "Trace key collision on '{name}'; qualify group traces before merging."
                )));
            }
            self.params.insert(name, chains);
        }
        Ok(())
    }

    /// Split R-hat per parameter.
    pub fn rhat(&self) -> BTreeMap<String, f64> {
        self.params
            .iter()
            .map(|(name, chains)| (name.clone(), split_rhat(chains)))
            .collect()
    }

    /// Fail if any parameter exceeds the R-hat gate.
    ///
    /// The diagnostic values are reported verbatim; there is no retry.
    pub fn check_convergence(&self, max_rhat: f64) -> Result<(), ModelError> {
        let failing: Vec<String> = self
            .rhat()
            .into_iter()
            .filter(|(_, r)| !r.is_finite() || *r > max_rhat)
            .map(|(name, r)| format!("{name} (split R-hat {r:.3})"))
            .collect();

        if failing.is_empty() {
            Ok(())
        } else {
            Err(ModelError::sampling(format!(
                "Chains did not converge for: {} (gate: R-hat <= {max_rhat}).",
                failing.join(", ")
            )))
        }
    }

    /// Posterior summary (mean, sd, HDI, R-hat) per parameter.
    pub fn summary(&self, hdi_prob: f64) -> Result<BTreeMap<String, ParamSummary>, ModelError> {
        if !(hdi_prob > 0.0 && hdi_prob <= 1.0) {
            return Err(ModelError::configuration(format!(
                "HDI probability must be in (0, 1], got {hdi_prob}."
            )));
        }

        let rhats = self.rhat();
        let mut out = BTreeMap::new();
        for (name, chains) in &self.params {
            let draws: Vec<f64> = chains.iter().flatten().copied().collect();
            let (hdi_low, hdi_high) = hdi(&draws, hdi_prob)
                .ok_or_else(|| ModelError::sampling(format!("No draws for parameter '{name}'.")))?;
            out.insert(
                name.clone(),
                ParamSummary {
                    mean: mean(&draws),
                    sd: sd(&draws),
                    hdi_low,
                    hdi_high,
                    rhat: rhats.get(name).copied().unwrap_or(f64::NAN),
                },
            );
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_trace() -> PosteriorTrace {
        // Two chains x four draws, two parameters.
        let mut params = BTreeMap::new();
        params.insert(
            "k".to_string(),
            vec![vec![0.1, 0.2, 0.3, 0.4], vec![0.2, 0.3, 0.4, 0.5]],
        );
        params.insert(
            "linf".to_string(),
            vec![vec![10.0, 11.0, 12.0, 13.0], vec![11.0, 12.0, 13.0, 14.0]],
        );
        PosteriorTrace::from_parameter_chains(params, vec![0.4, 0.4]).unwrap()
    }

    #[test]
    fn shape_invariants_are_enforced() {
        let mut params = BTreeMap::new();
        params.insert("a".to_string(), vec![vec![1.0, 2.0]]);
        params.insert("b".to_string(), vec![vec![1.0, 2.0, 3.0]]);
        assert!(PosteriorTrace::from_parameter_chains(params, vec![0.5]).is_err());
    }

    #[test]
    fn flattened_concatenates_chains_in_order() {
        let trace = toy_trace();
        assert_eq!(
            trace.flattened("k").unwrap(),
            vec![0.1, 0.2, 0.3, 0.4, 0.2, 0.3, 0.4, 0.5]
        );
    }

    #[test]
    fn lookup_falls_back_to_qualified_name() {
        let meta = ClassMetadata::new("shark_a").with_sex("female");
        let trace = toy_trace().qualified(&meta);
        let group = meta.group_key();

        assert!(trace.flattened("k").is_none());
        let draws = trace.lookup("k", Some(&group)).unwrap();
        assert_eq!(draws.len(), 8);
        assert!(trace.lookup("k", None).is_none());
    }

    #[test]
    fn merge_rejects_collisions_and_shape_mismatch() {
        let mut shared = toy_trace().qualified(&ClassMetadata::new("shark_a"));
        let other = toy_trace().qualified(&ClassMetadata::new("shark_b"));
        shared.merge(other.clone()).unwrap();
        // Merging the same group again collides.
        assert!(shared.merge(other).is_err());

        // A trace with a different draw count cannot be merged at all.
        let mut params = BTreeMap::new();
        params.insert("k".to_string(), vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
        let short = PosteriorTrace::from_parameter_chains(params, vec![0.4, 0.4]).unwrap();
        let err = shared
            .merge(short.qualified(&ClassMetadata::new("shark_c")))
            .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn summary_reports_all_parameters() {
        let trace = toy_trace();
        let summary = trace.summary(1.0).unwrap();
        assert_eq!(summary.len(), 2);
        let k = &summary["k"];
        assert!((k.mean - 0.3).abs() < 1e-12);
        assert_eq!((k.hdi_low, k.hdi_high), (0.1, 0.5));
    }

    #[test]
    fn summary_validates_hdi_prob() {
        assert!(toy_trace().summary(0.0).is_err());
        assert!(toy_trace().summary(1.5).is_err());
    }
}
