use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDateTime};
use common::{ForecastError, RawSeries, Result};
use tracing::debug;

use crate::frame::FeatureFrame;

/// One side of the preprocessing split: training frames are resampled and
/// interpolated from raw history, horizon frames are synthesized from a
/// contiguous future range. Both produce the same schema.
pub trait FrameBuilder {
    fn build(&self) -> Result<FeatureFrame>;
}

/// Builds the training frame: resample to the target frequency with mean
/// aggregation, linearly interpolate the resulting gaps, then derive the
/// calendar features.
pub struct TrainingFrameBuilder<'a> {
    series: &'a RawSeries,
    frequency_seconds: i64,
}

impl<'a> TrainingFrameBuilder<'a> {
    pub fn new(series: &'a RawSeries, frequency_seconds: i64) -> Self {
        Self {
            series,
            frequency_seconds,
        }
    }
}

impl FrameBuilder for TrainingFrameBuilder<'_> {
    fn build(&self) -> Result<FeatureFrame> {
        if self.frequency_seconds <= 0 {
            return Err(ForecastError::ConfigError(
                "resampling frequency must be positive".into(),
            ));
        }
        if self.series.is_empty() {
            return Err(ForecastError::InsufficientData(
                "no points to resample".into(),
            ));
        }

        let (timestamps, values) = resample_mean(self.series, self.frequency_seconds)?;
        debug!(
            raw_points = self.series.len(),
            resampled_points = timestamps.len(),
            "Resampled training series"
        );

        let values = interpolate_gaps(values);
        FeatureFrame::new(timestamps, Some(values))
    }
}

/// Builds the horizon frame: a contiguous range of `steps` buckets starting
/// at `start`, with no target column.
pub struct HorizonFrameBuilder {
    start: NaiveDateTime,
    steps: usize,
    frequency_seconds: i64,
}

impl HorizonFrameBuilder {
    pub fn new(start: NaiveDateTime, steps: usize, frequency_seconds: i64) -> Self {
        Self {
            start,
            steps,
            frequency_seconds,
        }
    }

    /// Horizon starting one frequency unit after the last training
    /// timestamp.
    pub fn after(last_training: NaiveDateTime, steps: usize, frequency_seconds: i64) -> Self {
        Self::new(
            last_training + Duration::seconds(frequency_seconds),
            steps,
            frequency_seconds,
        )
    }
}

impl FrameBuilder for HorizonFrameBuilder {
    fn build(&self) -> Result<FeatureFrame> {
        if self.frequency_seconds <= 0 {
            return Err(ForecastError::ConfigError(
                "horizon frequency must be positive".into(),
            ));
        }
        if self.steps == 0 {
            return Err(ForecastError::InvalidInput(
                "horizon must contain at least one step".into(),
            ));
        }

        let timestamps: Vec<NaiveDateTime> = (0..self.steps)
            .map(|i| self.start + Duration::seconds(self.frequency_seconds * i as i64))
            .collect();
        FeatureFrame::new(timestamps, None)
    }
}

/// Bucket the series to the frequency and average the values per bucket.
/// Buckets with no observations are emitted as NaN for the interpolation
/// pass. The returned index is strictly increasing and unique.
fn resample_mean(
    series: &RawSeries,
    frequency_seconds: i64,
) -> Result<(Vec<NaiveDateTime>, Vec<f64>)> {
    let mut buckets: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for (ts, value) in series {
        let bucket = ts.and_utc().timestamp().div_euclid(frequency_seconds);
        let entry = buckets.entry(bucket).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    let (first, last) = match (buckets.keys().next(), buckets.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            return Err(ForecastError::InsufficientData(
                "no points to resample".into(),
            ))
        }
    };

    let mut timestamps = Vec::with_capacity((last - first + 1) as usize);
    let mut values = Vec::with_capacity((last - first + 1) as usize);
    for bucket in first..=last {
        let ts = DateTime::from_timestamp(bucket * frequency_seconds, 0)
            .ok_or_else(|| {
                ForecastError::InvalidInput(format!("timestamp out of range: bucket {bucket}"))
            })?
            .naive_utc();
        timestamps.push(ts);
        values.push(match buckets.get(&bucket) {
            Some((sum, count)) => sum / *count as f64,
            None => f64::NAN,
        });
    }

    Ok((timestamps, values))
}

/// Linearly interpolate NaN runs between known values. Leading or trailing
/// NaNs cannot occur because the resampled range starts and ends at
/// observed buckets.
fn interpolate_gaps(mut values: Vec<f64>) -> Vec<f64> {
    let mut i = 0;
    while i < values.len() {
        if !values[i].is_nan() {
            i += 1;
            continue;
        }
        let prev = i - 1;
        let mut next = i;
        while next < values.len() && values[next].is_nan() {
            next += 1;
        }
        let base = values[prev];
        let step = (values[next] - base) / (next - prev) as f64;
        for (offset, slot) in values[prev + 1..next].iter_mut().enumerate() {
            *slot = base + step * (offset + 1) as f64;
        }
        i = next;
    }
    values
}
