//! Turns a scaled prediction series into "time until full": the crossing
//! scan over the horizon, the sentinel for horizons that never saturate,
//! and the fixed-offset saturation lookups.

use chrono::NaiveDateTime;
use common::{ForecastError, Result, SaturationForecast};
use tracing::debug;

/// A current scaled value at or above this is treated as already full.
pub const SATURATION_THRESHOLD: f64 = 0.99;

/// Fixed lookup offsets into the horizon, in hours. Months are counted
/// as 31 days; twelve months reads the last horizon point.
pub const OFFSET_3_MONTHS: usize = 24 * 31 * 3;
pub const OFFSET_6_MONTHS: usize = 24 * 31 * 6;

/// Resolved saturation horizon for one metric.
///
/// `forecast` holds the predictions kept for output: truncated at the
/// first capacity crossing, emptied when the metric is already full.
#[derive(Debug, Clone, PartialEq)]
pub struct SaturationResolution {
    pub hours_to_full: i64,
    pub days_to_full: i64,
    pub forecast: Vec<f64>,
    pub forecast_dates: Vec<NaiveDateTime>,
    pub saturation_3_months: Option<SaturationForecast>,
    pub saturation_6_months: Option<SaturationForecast>,
    pub saturation_12_months: Option<SaturationForecast>,
}

/// Scan the scaled horizon predictions for the first value outside
/// `[0, 1]` and derive hours/days until full.
///
/// Already-full metrics short-circuit to zero hours with an empty
/// forecast. A horizon that never crosses reports `len + 1` hours, the
/// sentinel for "not reached within the horizon". The N-month lookups
/// always read the untruncated series and clamp to its last point when
/// the horizon is shorter than the offset.
pub fn resolve(
    predictions: &[f64],
    timestamps: &[NaiveDateTime],
    current_saturation: f64,
) -> Result<SaturationResolution> {
    if predictions.len() != timestamps.len() {
        return Err(ForecastError::InvalidInput(format!(
            "prediction/timestamp length mismatch: {} vs {}",
            predictions.len(),
            timestamps.len()
        )));
    }
    if predictions.is_empty() {
        return Err(ForecastError::InvalidInput(
            "empty prediction series".into(),
        ));
    }

    let saturation_3_months = lookup(predictions, current_saturation, OFFSET_3_MONTHS);
    let saturation_6_months = lookup(predictions, current_saturation, OFFSET_6_MONTHS);
    let saturation_12_months = lookup(predictions, current_saturation, predictions.len() - 1);

    let (hours_to_full, forecast, forecast_dates) = if current_saturation >= SATURATION_THRESHOLD {
        (0, Vec::new(), Vec::new())
    } else {
        match predictions.iter().position(|&p| !(0.0..=1.0).contains(&p)) {
            Some(k) => {
                let hours = (timestamps[k] - timestamps[0]).num_hours();
                (hours, predictions[..k].to_vec(), timestamps[..k].to_vec())
            }
            None => (
                predictions.len() as i64 + 1,
                predictions.to_vec(),
                timestamps.to_vec(),
            ),
        }
    };

    let days_to_full = hours_to_full / 24;
    debug!(hours_to_full, days_to_full, "Resolved saturation horizon");

    Ok(SaturationResolution {
        hours_to_full,
        days_to_full,
        forecast,
        forecast_dates,
        saturation_3_months,
        saturation_6_months,
        saturation_12_months,
    })
}

fn lookup(predictions: &[f64], current: f64, offset: usize) -> Option<SaturationForecast> {
    let idx = offset.min(predictions.len().checked_sub(1)?);
    Some(SaturationForecast {
        current_saturation: Some(current),
        forecast: predictions[idx],
    })
}
