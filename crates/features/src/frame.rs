use chrono::{Datelike, NaiveDateTime, Timelike};
use common::{ForecastError, Result};

/// Engineered feature column names, in schema order. The order is shared
/// by training and horizon frames so they can share one fitted scaler.
pub const FEATURE_NAMES: [&str; 6] = ["timestamp", "day", "hour", "minute", "dayofweek", "weekend"];

/// A resampled metric series extended with calendar feature columns.
///
/// The target column is the (scaled or raw) metric value; it is `None` for
/// horizon frames, whose values are filled in later by predictions.
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    timestamps: Vec<NaiveDateTime>,
    target: Option<Vec<f64>>,
    feature_names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl FeatureFrame {
    /// Build a frame from timestamps and an optional target column,
    /// deriving the calendar features from the index.
    pub fn new(timestamps: Vec<NaiveDateTime>, target: Option<Vec<f64>>) -> Result<Self> {
        if timestamps.is_empty() {
            return Err(ForecastError::InsufficientData(
                "cannot build a feature frame from an empty index".into(),
            ));
        }
        if let Some(values) = &target {
            if values.len() != timestamps.len() {
                return Err(ForecastError::InvalidInput(format!(
                    "target length {} does not match index length {}",
                    values.len(),
                    timestamps.len()
                )));
            }
        }
        if timestamps.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ForecastError::InvalidInput(
                "feature frame index must be strictly increasing".into(),
            ));
        }

        let columns = calendar_columns(&timestamps);
        Ok(Self {
            timestamps,
            target,
            feature_names: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
            columns,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.timestamps.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn target(&self) -> Option<&[f64]> {
        self.target.as_deref()
    }

    pub fn set_target(&mut self, values: Vec<f64>) -> Result<()> {
        if values.len() != self.timestamps.len() {
            return Err(ForecastError::InvalidInput(format!(
                "target length {} does not match index length {}",
                values.len(),
                self.timestamps.len()
            )));
        }
        self.target = Some(values);
        Ok(())
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn column(&self, idx: usize) -> &[f64] {
        &self.columns[idx]
    }

    pub fn set_column(&mut self, idx: usize, values: Vec<f64>) -> Result<()> {
        if values.len() != self.timestamps.len() {
            return Err(ForecastError::InvalidInput(
                "column length does not match index length".into(),
            ));
        }
        self.columns[idx] = values;
        Ok(())
    }

    /// One row of the design matrix, features in schema order.
    pub fn row(&self, i: usize) -> Vec<f64> {
        self.columns.iter().map(|c| c[i]).collect()
    }

    /// Materialize the full design matrix, row-major.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        (0..self.n_rows()).map(|i| self.row(i)).collect()
    }

    /// Drop feature columns with a single unique value and return the
    /// retained feature names, to be replayed on the horizon frame.
    pub fn drop_constant_features(&mut self) -> Vec<String> {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|col| col.windows(2).any(|w| w[0] != w[1]))
            .collect();

        let mut names = Vec::new();
        let mut columns = Vec::new();
        for (i, keep_col) in keep.iter().enumerate() {
            if *keep_col {
                names.push(self.feature_names[i].clone());
                columns.push(std::mem::take(&mut self.columns[i]));
            }
        }
        self.feature_names = names.clone();
        self.columns = columns;
        names
    }

    /// Keep only the named feature columns, in the given order.
    pub fn select_features(&mut self, names: &[String]) -> Result<()> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let idx = self
                .feature_names
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| {
                    ForecastError::InvalidInput(format!("unknown feature column: {name}"))
                })?;
            columns.push(self.columns[idx].clone());
        }
        self.feature_names = names.to_vec();
        self.columns = columns;
        Ok(())
    }
}

/// Derive the calendar feature columns from a time index.
///
/// dayofweek is 0 for Monday through 6 for Sunday; weekend flags Saturday
/// and Sunday.
fn calendar_columns(timestamps: &[NaiveDateTime]) -> Vec<Vec<f64>> {
    let n = timestamps.len();
    let mut epoch = Vec::with_capacity(n);
    let mut day = Vec::with_capacity(n);
    let mut hour = Vec::with_capacity(n);
    let mut minute = Vec::with_capacity(n);
    let mut dayofweek = Vec::with_capacity(n);
    let mut weekend = Vec::with_capacity(n);

    for ts in timestamps {
        let dow = ts.weekday().num_days_from_monday();
        epoch.push(ts.and_utc().timestamp() as f64);
        day.push(ts.day() as f64);
        hour.push(ts.hour() as f64);
        minute.push(ts.minute() as f64);
        dayofweek.push(dow as f64);
        weekend.push(if dow >= 5 { 1.0 } else { 0.0 });
    }

    vec![epoch, day, hour, minute, dayofweek, weekend]
}
