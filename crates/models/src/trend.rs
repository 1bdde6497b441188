use common::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Robust degree-1 polynomial regression, fitted with iteratively
/// reweighted least squares under the Huber loss.
///
/// Captures slow drift on the temporal axis without being dragged by
/// outliers; large `epsilon` degrades gracefully toward ordinary least
/// squares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuberRegressor {
    epsilon: f64,
    slope: Option<f64>,
    intercept: Option<f64>,
}

impl HuberRegressor {
    const MAX_ITER: usize = 50;
    const TOLERANCE: f64 = 1e-8;

    pub fn new(epsilon: f64) -> Result<Self> {
        if !epsilon.is_finite() || epsilon < 1.0 {
            return Err(ForecastError::InvalidInput(format!(
                "huber epsilon must be >= 1, got {epsilon}"
            )));
        }
        Ok(Self {
            epsilon,
            slope: None,
            intercept: None,
        })
    }

    pub fn fit(&mut self, x: &[f64], y: &[f64]) -> Result<()> {
        if x.len() != y.len() || x.len() < 2 {
            return Err(ForecastError::InsufficientData(
                "trend fit needs at least two points".into(),
            ));
        }

        // Start from the OLS solution, then reweight.
        let (mut slope, mut intercept) = weighted_least_squares(x, y, None)?;

        for _ in 0..Self::MAX_ITER {
            let residuals: Vec<f64> = x
                .iter()
                .zip(y)
                .map(|(xi, yi)| yi - (slope * xi + intercept))
                .collect();

            let scale = robust_scale(&residuals);
            if scale < 1e-12 {
                break;
            }

            let cutoff = self.epsilon * scale;
            let weights: Vec<f64> = residuals
                .iter()
                .map(|r| {
                    if r.abs() <= cutoff {
                        1.0
                    } else {
                        cutoff / r.abs()
                    }
                })
                .collect();

            let (new_slope, new_intercept) = weighted_least_squares(x, y, Some(&weights))?;
            let shift = (new_slope - slope).abs() + (new_intercept - intercept).abs();
            slope = new_slope;
            intercept = new_intercept;
            if shift < Self::TOLERANCE {
                break;
            }
        }

        self.slope = Some(slope);
        self.intercept = Some(intercept);
        Ok(())
    }

    pub fn predict(&self, x: &[f64]) -> Result<Vec<f64>> {
        match (self.slope, self.intercept) {
            (Some(slope), Some(intercept)) => {
                Ok(x.iter().map(|xi| slope * xi + intercept).collect())
            }
            _ => Err(ForecastError::InvalidInput(
                "trend regressor not fitted".into(),
            )),
        }
    }

    pub fn slope(&self) -> Option<f64> {
        self.slope
    }
}

/// Closed-form weighted least squares for a line.
fn weighted_least_squares(x: &[f64], y: &[f64], weights: Option<&[f64]>) -> Result<(f64, f64)> {
    let mut sw = 0.0;
    let mut sx = 0.0;
    let mut sy = 0.0;
    let mut sxx = 0.0;
    let mut sxy = 0.0;

    for i in 0..x.len() {
        let w = weights.map(|ws| ws[i]).unwrap_or(1.0);
        sw += w;
        sx += w * x[i];
        sy += w * y[i];
        sxx += w * x[i] * x[i];
        sxy += w * x[i] * y[i];
    }

    let denom = sw * sxx - sx * sx;
    if denom.abs() < 1e-15 {
        // Degenerate x (all points identical): flat line through the mean.
        if sw < 1e-15 {
            return Err(ForecastError::ModelError(
                "all weights collapsed to zero in trend fit".into(),
            ));
        }
        return Ok((0.0, sy / sw));
    }

    let slope = (sw * sxy - sx * sy) / denom;
    let intercept = (sy - slope * sx) / sw;
    Ok((slope, intercept))
}

/// MAD-based residual scale estimate (consistent for a normal
/// distribution), falling back to the standard deviation when MAD
/// degenerates.
fn robust_scale(residuals: &[f64]) -> f64 {
    let abs: Vec<f64> = residuals.iter().map(|r| r.abs()).collect();
    let mad = common::metrics::quantile(&abs, 0.5);
    if mad > 1e-12 {
        1.4826 * mad
    } else {
        common::metrics::std_dev(residuals)
    }
}
