use common::metrics::quantile;
use common::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::tree::{RegressionTree, TreeParams};

/// Hyperparameters of the `Light` family: histogram splits with L1/L2
/// leaf regularization and a wide round budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightParams {
    pub quantile: f64,
    pub learning_rate: f64,
    pub n_rounds: usize,
    pub l1: f64,
    pub l2: f64,
}

/// Hyperparameters of the `Classic` family: exact split search, no leaf
/// regularization, small leaves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassicParams {
    pub quantile: f64,
    pub learning_rate: f64,
    pub n_rounds: usize,
}

/// Hyperparameters of the `Hist` family: coarse histogram splits and a
/// larger leaf-size floor, trading precision for speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistParams {
    pub quantile: f64,
    pub learning_rate: f64,
    pub n_rounds: usize,
}

/// The three interchangeable quantile gradient boosting families. Each
/// variant carries its own typed hyperparameter schema; the search trial
/// picks one and the engine below runs it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GbmFamily {
    Light(LightParams),
    Classic(ClassicParams),
    Hist(HistParams),
}

impl GbmFamily {
    pub fn name(&self) -> &'static str {
        match self {
            GbmFamily::Light(_) => "light",
            GbmFamily::Classic(_) => "classic",
            GbmFamily::Hist(_) => "hist",
        }
    }

    pub fn quantile(&self) -> f64 {
        match self {
            GbmFamily::Light(p) => p.quantile,
            GbmFamily::Classic(p) => p.quantile,
            GbmFamily::Hist(p) => p.quantile,
        }
    }

    /// Same family and hyperparameters with the quantile target forced,
    /// used for the low/high refits after the search.
    pub fn with_quantile(&self, q: f64) -> GbmFamily {
        let mut copy = *self;
        match &mut copy {
            GbmFamily::Light(p) => p.quantile = q,
            GbmFamily::Classic(p) => p.quantile = q,
            GbmFamily::Hist(p) => p.quantile = q,
        }
        copy
    }

    fn engine_params(&self) -> EngineParams {
        match self {
            GbmFamily::Light(p) => EngineParams {
                quantile: p.quantile,
                learning_rate: p.learning_rate,
                n_rounds: p.n_rounds,
                l1: p.l1,
                l2: p.l2,
                tree: TreeParams {
                    max_depth: 3,
                    min_samples_leaf: 5,
                    max_bins: Some(64),
                },
            },
            GbmFamily::Classic(p) => EngineParams {
                quantile: p.quantile,
                learning_rate: p.learning_rate,
                n_rounds: p.n_rounds,
                l1: 0.0,
                l2: 0.0,
                tree: TreeParams {
                    max_depth: 3,
                    min_samples_leaf: 2,
                    max_bins: None,
                },
            },
            GbmFamily::Hist(p) => EngineParams {
                quantile: p.quantile,
                learning_rate: p.learning_rate,
                n_rounds: p.n_rounds,
                l1: 0.0,
                l2: 0.0,
                tree: TreeParams {
                    max_depth: 3,
                    min_samples_leaf: 20,
                    max_bins: Some(256),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct EngineParams {
    quantile: f64,
    learning_rate: f64,
    n_rounds: usize,
    l1: f64,
    l2: f64,
    tree: TreeParams,
}

/// Gradient boosting engine with pinball (quantile) loss.
///
/// Trees are grown on the loss's pseudo-residuals and each leaf is then
/// re-estimated as the target quantile of the raw residuals it contains,
/// shrunk by the learning rate and the family's leaf regularization.
/// Deterministic: no row or feature subsampling.
#[derive(Debug, Clone)]
pub struct GradientBooster {
    base: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBooster {
    /// Boosting stops early once the training pinball loss plateaus, so
    /// oversized round budgets do not burn the search's time budget.
    const STOP_TOLERANCE: f64 = 1e-7;
    const STOP_PATIENCE: usize = 5;

    pub fn fit(family: &GbmFamily, x: &[Vec<f64>], y: &[f64]) -> Result<Self> {
        let params = family.engine_params();
        if x.len() != y.len() || y.is_empty() {
            return Err(ForecastError::InvalidInput(
                "design matrix and target must be non-empty and equal length".into(),
            ));
        }
        if !(0.0..=1.0).contains(&params.quantile) {
            return Err(ForecastError::InvalidInput(format!(
                "quantile out of range: {}",
                params.quantile
            )));
        }

        let alpha = params.quantile;
        let base = quantile(y, alpha);
        let mut f: Vec<f64> = vec![base; y.len()];
        let mut trees = Vec::new();

        let mut prev_loss = pinball_loss(y, &f, alpha);
        let mut stalled = 0usize;

        for round in 0..params.n_rounds {
            // Pinball-loss pseudo-residuals.
            let grad: Vec<f64> = y
                .iter()
                .zip(&f)
                .map(|(yi, fi)| if yi > fi { alpha } else { alpha - 1.0 })
                .collect();

            let (mut tree, leaf_of_row) = RegressionTree::fit(x, &grad, params.tree);

            // Per-leaf quantile re-estimation on the raw residuals.
            let mut leaf_rows: std::collections::HashMap<usize, Vec<usize>> =
                std::collections::HashMap::new();
            for (row, &leaf) in leaf_of_row.iter().enumerate() {
                leaf_rows.entry(leaf).or_default().push(row);
            }
            for (leaf, rows) in &leaf_rows {
                let residuals: Vec<f64> = rows.iter().map(|&i| y[i] - f[i]).collect();
                let raw = quantile(&residuals, alpha);
                let value = regularize_leaf(raw, rows.len(), params.l1, params.l2);
                tree.set_leaf_value(*leaf, value);
            }

            for (i, row) in x.iter().enumerate() {
                f[i] += params.learning_rate * tree.predict_row(row);
            }
            trees.push(tree);

            let loss = pinball_loss(y, &f, alpha);
            if prev_loss - loss <= Self::STOP_TOLERANCE * prev_loss.max(1e-12) {
                stalled += 1;
                if stalled >= Self::STOP_PATIENCE {
                    trace!(round, loss, "Boosting converged early");
                    break;
                }
            } else {
                stalled = 0;
            }
            prev_loss = loss;
        }

        Ok(Self {
            base,
            learning_rate: params.learning_rate,
            trees,
        })
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter()
            .map(|row| {
                self.base
                    + self.learning_rate
                        * self
                            .trees
                            .iter()
                            .map(|t| t.predict_row(row))
                            .sum::<f64>()
            })
            .collect()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Shrink a leaf value with L1 soft-thresholding and L2 damping, both
/// scaled by the leaf size so bigger leaves are regularized less.
fn regularize_leaf(value: f64, n_leaf: usize, l1: f64, l2: f64) -> f64 {
    let n = n_leaf.max(1) as f64;
    let thresholded = value.signum() * (value.abs() - l1 / n).max(0.0);
    thresholded / (1.0 + l2 / n)
}

fn pinball_loss(y: &[f64], f: &[f64], alpha: f64) -> f64 {
    y.iter()
        .zip(f)
        .map(|(yi, fi)| {
            let diff = yi - fi;
            if diff >= 0.0 {
                alpha * diff
            } else {
                (alpha - 1.0) * -diff
            }
        })
        .sum::<f64>()
        / y.len().max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn family(quantile: f64) -> GbmFamily {
        GbmFamily::Classic(ClassicParams {
            quantile,
            learning_rate: 0.1,
            n_rounds: 200,
        })
    }

    fn noisy_sine() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..200).map(|i| vec![i as f64 / 200.0]).collect();
        // Deterministic "noise" from a fixed irrational stride.
        let y: Vec<f64> = (0..200)
            .map(|i| {
                let t = i as f64 / 200.0;
                (t * 12.0).sin() + 0.1 * ((i as f64 * 0.7548776662).fract() - 0.5)
            })
            .collect();
        (x, y)
    }

    #[test]
    fn test_median_fit_tracks_signal() {
        let (x, y) = noisy_sine();
        let model = GradientBooster::fit(&family(0.5), &x, &y).unwrap();
        let preds = model.predict(&x);

        let mae: f64 = preds
            .iter()
            .zip(&y)
            .map(|(p, t)| (p - t).abs())
            .sum::<f64>()
            / y.len() as f64;
        assert!(mae < 0.15, "median fit too loose: mae = {mae}");
    }

    #[test]
    fn test_quantile_ordering() {
        let (x, y) = noisy_sine();
        let low = GradientBooster::fit(&family(0.05), &x, &y).unwrap();
        let high = GradientBooster::fit(&family(0.95), &x, &y).unwrap();

        let low_preds = low.predict(&x);
        let high_preds = high.predict(&x);
        let below: usize = low_preds
            .iter()
            .zip(&high_preds)
            .filter(|(l, h)| l <= h)
            .count();
        assert!(below as f64 / y.len() as f64 > 0.95);
    }

    #[test]
    fn test_constant_target() {
        let x: Vec<Vec<f64>> = (0..50).map(|i| vec![i as f64]).collect();
        let y = vec![2.0; 50];
        let model = GradientBooster::fit(&family(0.5), &x, &y).unwrap();
        for p in model.predict(&x) {
            assert_relative_eq!(p, 2.0, epsilon = 1e-9);
        }
        // Converged immediately instead of burning every round.
        assert!(model.n_trees() < 10);
    }

    #[test]
    fn test_determinism() {
        let (x, y) = noisy_sine();
        let a = GradientBooster::fit(&family(0.5), &x, &y).unwrap().predict(&x);
        let b = GradientBooster::fit(&family(0.5), &x, &y).unwrap().predict(&x);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(GradientBooster::fit(&family(0.5), &[], &[]).is_err());
    }

    #[test]
    fn test_family_quantile_override() {
        let fam = family(0.42).with_quantile(0.99);
        assert_relative_eq!(fam.quantile(), 0.99, epsilon = 1e-12);
        assert_eq!(fam.name(), "classic");
    }
}
