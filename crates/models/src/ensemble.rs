use common::Result;
use tracing::debug;

use crate::gbm::{GbmFamily, GradientBooster};
use crate::trend::HuberRegressor;

/// Quantile levels the low/high companions are forced to after the search.
pub const LOW_QUANTILE: f64 = 0.01;
pub const HIGH_QUANTILE: f64 = 0.99;

/// Configuration of the optional trend-removal stage: a robust degree-1
/// fit on the temporal feature, blended by a damping factor in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendSpec {
    pub damping: f64,
    pub huber_epsilon: f64,
}

/// A fitted trend stage.
#[derive(Debug, Clone)]
pub struct TrendComponent {
    damping: f64,
    regressor: HuberRegressor,
}

impl TrendComponent {
    /// Fit on the temporal axis and the raw target.
    pub fn fit(spec: TrendSpec, temporal: &[f64], y: &[f64]) -> Result<Self> {
        let mut regressor = HuberRegressor::new(spec.huber_epsilon)?;
        regressor.fit(temporal, y)?;
        Ok(Self {
            damping: spec.damping,
            regressor,
        })
    }

    /// Damped trend contribution at the given temporal positions.
    pub fn contribution(&self, temporal: &[f64]) -> Result<Vec<f64>> {
        let preds = self.regressor.predict(temporal)?;
        Ok(preds.iter().map(|p| self.damping * p).collect())
    }

    /// Subtract the damped trend from a target, producing the residual the
    /// boosted model trains on.
    pub fn detrend(&self, temporal: &[f64], y: &[f64]) -> Result<Vec<f64>> {
        let contribution = self.contribution(temporal)?;
        Ok(y.iter()
            .zip(&contribution)
            .map(|(yi, c)| yi - c)
            .collect())
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }
}

/// The winning configuration refit on the full training set: point, low
/// and high quantile boosters sharing every other hyperparameter, plus
/// the optional damped additive trend.
///
/// Prediction is `booster(X) + damping · trend(X[:, 0])`; the temporal
/// feature is by convention the first design-matrix column.
#[derive(Debug, Clone)]
pub struct DetrendedEnsemble {
    family: GbmFamily,
    trend: Option<TrendComponent>,
    point: GradientBooster,
    low: GradientBooster,
    high: GradientBooster,
}

impl DetrendedEnsemble {
    pub fn fit(
        family: GbmFamily,
        trend_spec: Option<TrendSpec>,
        x: &[Vec<f64>],
        y: &[f64],
    ) -> Result<Self> {
        let temporal = temporal_column(x);
        let trend = match trend_spec {
            Some(spec) => Some(TrendComponent::fit(spec, &temporal, y)?),
            None => None,
        };

        let target = match &trend {
            Some(component) => component.detrend(&temporal, y)?,
            None => y.to_vec(),
        };

        let point = GradientBooster::fit(&family, x, &target)?;
        let low = GradientBooster::fit(&family.with_quantile(LOW_QUANTILE), x, &target)?;
        let high = GradientBooster::fit(&family.with_quantile(HIGH_QUANTILE), x, &target)?;

        debug!(
            family = family.name(),
            quantile = family.quantile(),
            detrended = trend.is_some(),
            trees = point.n_trees(),
            "Fitted quantile ensemble"
        );

        Ok(Self {
            family,
            trend,
            point,
            low,
            high,
        })
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        self.predict_with(&self.point, x)
    }

    pub fn predict_low(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        self.predict_with(&self.low, x)
    }

    pub fn predict_high(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        self.predict_with(&self.high, x)
    }

    fn predict_with(&self, booster: &GradientBooster, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        let mut preds = booster.predict(x);
        if let Some(trend) = &self.trend {
            let contribution = trend.contribution(&temporal_column(x))?;
            for (p, c) in preds.iter_mut().zip(&contribution) {
                *p += c;
            }
        }
        Ok(preds)
    }

    pub fn family(&self) -> &GbmFamily {
        &self.family
    }

    pub fn trend(&self) -> Option<&TrendComponent> {
        self.trend.as_ref()
    }
}

/// The temporal feature is the first column of the design matrix.
pub fn temporal_column(x: &[Vec<f64>]) -> Vec<f64> {
    x.iter().map(|row| row[0]).collect()
}
