use std::collections::BTreeMap;

use common::metrics::quantile;
use tracing::trace;

/// Successive-halving pruner over per-fold running means.
///
/// Trials report their running mean error after each fold. At rung steps
/// (fold counts 1, 2, 4, …) the value is compared against every other
/// trial's report at the same rung; trials outside the best
/// `1/reduction_factor` fraction are told to stop. Early rungs therefore
/// kill clearly unpromising trials after a single fold.
#[derive(Debug)]
pub struct SuccessiveHalvingPruner {
    reduction_factor: usize,
    /// Rung step → values reported by all trials at that step.
    rungs: BTreeMap<usize, Vec<f64>>,
}

impl SuccessiveHalvingPruner {
    pub fn new() -> Self {
        Self {
            reduction_factor: 2,
            rungs: BTreeMap::new(),
        }
    }

    /// Record a trial's running mean at fold count `step` (1-based) and
    /// decide whether the trial should be pruned.
    pub fn observe(&mut self, step: usize, running_mean: f64) -> bool {
        if !running_mean.is_finite() {
            return true;
        }
        if !is_rung(step, self.reduction_factor) {
            return false;
        }

        let values = self.rungs.entry(step).or_default();
        // Not enough competition at this rung yet to judge.
        let prune = if values.len() >= self.reduction_factor {
            let survivor_cutoff = quantile(values, 1.0 / self.reduction_factor as f64);
            running_mean > survivor_cutoff
        } else {
            false
        };

        values.push(running_mean);
        if prune {
            trace!(step, running_mean, "Trial behind rung survivors");
        }
        prune
    }
}

impl Default for SuccessiveHalvingPruner {
    fn default() -> Self {
        Self::new()
    }
}

/// Rungs are at steps 1, r, r², …
fn is_rung(step: usize, reduction_factor: usize) -> bool {
    let mut rung = 1;
    loop {
        if rung == step {
            return true;
        }
        if rung > step {
            return false;
        }
        rung *= reduction_factor.max(2);
    }
}
