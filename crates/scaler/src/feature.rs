use common::{ForecastError, Result};
use features::FeatureFrame;
use serde::{Deserialize, Serialize};

use crate::{MinMaxScaler, Scaler};

/// Scales every feature column of a frame to `[0, 1]` with per-column
/// min–max parameters fitted on the training frame.
///
/// The fitted parameters are replayed unchanged on the horizon frame:
/// fitting happens exactly once, on training data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureScaler {
    feature_names: Vec<String>,
    columns: Vec<MinMaxScaler>,
}

impl FeatureScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit per-column parameters on the training frame and scale it in
    /// place.
    pub fn fit_transform_frame(&mut self, frame: &mut FeatureFrame) -> Result<()> {
        self.feature_names = frame.feature_names().to_vec();
        self.columns = Vec::with_capacity(frame.n_features());

        for idx in 0..frame.n_features() {
            let mut scaler = MinMaxScaler::new();
            let scaled = scaler.fit_transform(frame.column(idx))?;
            frame.set_column(idx, scaled)?;
            self.columns.push(scaler);
        }
        Ok(())
    }

    /// Scale another frame with the training-fitted parameters. The frame
    /// must carry exactly the fitted columns, in the fitted order.
    pub fn transform_frame(&self, frame: &mut FeatureFrame) -> Result<()> {
        if frame.feature_names() != self.feature_names.as_slice() {
            return Err(ForecastError::InvalidInput(format!(
                "feature columns {:?} do not match fitted columns {:?}",
                frame.feature_names(),
                self.feature_names
            )));
        }
        for (idx, scaler) in self.columns.iter().enumerate() {
            let scaled = scaler.transform(frame.column(idx))?;
            frame.set_column(idx, scaled)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use common::RawSeries;
    use features::{FrameBuilder, HorizonFrameBuilder, TrainingFrameBuilder};

    const HOUR: i64 = 3600;

    fn train_frame(n: usize) -> FeatureFrame {
        let base = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let series: RawSeries = (0..n)
            .map(|i| (base + Duration::hours(i as i64), i as f64))
            .collect();
        TrainingFrameBuilder::new(&series, HOUR).build().unwrap()
    }

    #[test]
    fn test_training_columns_land_in_unit_interval() {
        let mut frame = train_frame(100);
        frame.drop_constant_features();

        let mut scaler = FeatureScaler::new();
        scaler.fit_transform_frame(&mut frame).unwrap();

        for idx in 0..frame.n_features() {
            for v in frame.column(idx) {
                assert!((0.0..=1.0).contains(v), "column {idx} value {v}");
            }
        }
    }

    #[test]
    fn test_horizon_uses_training_parameters() {
        let mut train = train_frame(100);
        let retained = train.drop_constant_features();

        let mut scaler = FeatureScaler::new();
        scaler.fit_transform_frame(&mut train).unwrap();

        let last = *train.timestamps().last().unwrap();
        let mut horizon = HorizonFrameBuilder::after(last, 24, HOUR).build().unwrap();
        horizon.select_features(&retained).unwrap();
        scaler.transform_frame(&mut horizon).unwrap();

        // The horizon's epoch timestamps lie beyond the training domain,
        // so the scaled first column exceeds 1.0 only if the training
        // parameters were replayed rather than refitted.
        let ts_idx = horizon
            .feature_names()
            .iter()
            .position(|n| n == "timestamp")
            .unwrap();
        assert!(horizon.column(ts_idx).iter().all(|v| *v > 1.0));
    }

    #[test]
    fn test_mismatched_columns_rejected() {
        let mut train = train_frame(50);
        train.drop_constant_features();
        let mut scaler = FeatureScaler::new();
        scaler.fit_transform_frame(&mut train).unwrap();

        let last = *train.timestamps().last().unwrap();
        let mut horizon = HorizonFrameBuilder::after(last, 5, HOUR).build().unwrap();
        // Horizon still carries the full schema; transform must refuse.
        assert!(scaler.transform_frame(&mut horizon).is_err());
    }
}
