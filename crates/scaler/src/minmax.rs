use common::{ForecastError, Result};
use serde::{Deserialize, Serialize};

use crate::Scaler;

/// Min–max scaler mapping a domain `[min, max]` onto `[0, 1]`.
///
/// The domain can be fitted from observed values, or fixed explicitly via
/// [`MinMaxScaler::with_domain`]. The explicit form is what the target
/// column uses: fitting `[0, capacity]` keeps "1.0 = at capacity"
/// meaningful even when the metric has never reached its bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: Option<f64>,
    max: Option<f64>,
}

impl MinMaxScaler {
    const EPSILON: f64 = 1e-12;

    pub fn new() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// Scaler with a fixed domain, independent of any observed values.
    /// The domain must be non-degenerate and finite.
    pub fn with_domain(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ForecastError::InvalidInput(
                "scaler domain must be finite".into(),
            ));
        }
        if max - min < Self::EPSILON {
            return Err(ForecastError::InvalidInput(format!(
                "degenerate scaler domain [{min}, {max}]"
            )));
        }
        Ok(Self {
            min: Some(min),
            max: Some(max),
        })
    }

    fn domain(&self) -> Result<(f64, f64)> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Ok((min, max)),
            _ => Err(ForecastError::InvalidInput("scaler not fitted".into())),
        }
    }

    /// Returns true if the fitted domain collapsed to a single value.
    pub fn is_constant(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if max - min < Self::EPSILON)
    }
}

impl Default for MinMaxScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scaler for MinMaxScaler {
    fn fit(&mut self, values: &[f64]) -> Result<()> {
        if values.is_empty() {
            return Err(ForecastError::InsufficientData(
                "cannot fit scaler on empty values".into(),
            ));
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        self.min = Some(min);
        self.max = Some(max);
        Ok(())
    }

    fn transform(&self, values: &[f64]) -> Result<Vec<f64>> {
        let (min, max) = self.domain()?;
        let range = max - min;
        if range < Self::EPSILON {
            return Ok(vec![0.0; values.len()]);
        }
        Ok(values.iter().map(|v| (v - min) / range).collect())
    }

    fn inverse_transform(&self, values: &[f64]) -> Result<Vec<f64>> {
        let (min, max) = self.domain()?;
        let range = max - min;
        if range < Self::EPSILON {
            return Ok(vec![min; values.len()]);
        }
        Ok(values.iter().map(|v| v * range + min).collect())
    }
}
