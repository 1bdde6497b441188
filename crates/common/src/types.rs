use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Raw time-series data as timestamp → value mapping.
/// BTreeMap keeps the points sorted with one value per timestamp.
pub type RawSeries = BTreeMap<NaiveDateTime, f64>;

/// Timestamp format used in serialized outcomes.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Identity of one monitored metric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricKey {
    pub organization: String,
    pub metric_name: String,
    pub host_id: String,
    pub service_id: String,
    pub platform_uuid: String,
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}#{}#{}",
            self.organization, self.metric_name, self.host_id, self.service_id
        )
    }
}

/// Which end of the permissible range a capacity bound describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundKind {
    Min,
    Max,
}

/// Discrete 0–2 summary of model fit quality.
///
/// Serialized as its numeric level so downstream consumers see `0`, `1`
/// or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ConfidenceGrade {
    Low,
    Fair,
    High,
}

impl ConfidenceGrade {
    pub fn level(self) -> u8 {
        self.into()
    }
}

impl From<ConfidenceGrade> for u8 {
    fn from(grade: ConfidenceGrade) -> Self {
        match grade {
            ConfidenceGrade::Low => 0,
            ConfidenceGrade::Fair => 1,
            ConfidenceGrade::High => 2,
        }
    }
}

impl TryFrom<u8> for ConfidenceGrade {
    type Error = String;

    fn try_from(level: u8) -> std::result::Result<Self, Self::Error> {
        match level {
            0 => Ok(ConfidenceGrade::Low),
            1 => Ok(ConfidenceGrade::Fair),
            2 => Ok(ConfidenceGrade::High),
            other => Err(format!("confidence grade out of range: {other}")),
        }
    }
}

/// Saturation ratio at a fixed horizon offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaturationForecast {
    pub current_saturation: Option<f64>,
    pub forecast: f64,
}

/// Final, immutable result of one metric's forecast run.
///
/// Created once per orchestrator run, serialized, then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastOutcome {
    pub metric_name: String,
    pub host_id: String,
    pub host_name: String,
    pub service_id: String,
    pub service_name: String,

    /// Scaled training history and its timestamps.
    pub data_scaled: Vec<f64>,
    pub data_dates: Vec<String>,

    /// Point predictions over the horizon, truncated at the first
    /// saturation crossing.
    pub forecast: Vec<f64>,
    pub forecast_dates: Vec<String>,

    /// None when there was not enough history to forecast.
    pub days_to_full: Option<i64>,
    pub current_saturation: Option<f64>,
    pub saturation_3_months: Option<SaturationForecast>,
    pub saturation_6_months: Option<SaturationForecast>,
    pub saturation_12_months: Option<SaturationForecast>,

    pub confidence_level: ConfidenceGrade,

    /// Stable opaque identifier assigned by the result sink.
    pub uuid: String,
}

impl ForecastOutcome {
    /// Outcome for a metric with too little history: no forecast, no
    /// saturation estimates, lowest confidence.
    pub fn neutral(key: &MetricKey, host_name: &str, service_name: &str, uuid: &str) -> Self {
        Self {
            metric_name: key.metric_name.clone(),
            host_id: key.host_id.clone(),
            host_name: host_name.to_string(),
            service_id: key.service_id.clone(),
            service_name: service_name.to_string(),
            data_scaled: Vec::new(),
            data_dates: Vec::new(),
            forecast: Vec::new(),
            forecast_dates: Vec::new(),
            days_to_full: None,
            current_saturation: None,
            saturation_3_months: None,
            saturation_6_months: None,
            saturation_12_months: None,
            confidence_level: ConfidenceGrade::Low,
            uuid: uuid.to_string(),
        }
    }
}

/// Format timestamps for the serialized payload.
pub fn format_dates(timestamps: &[NaiveDateTime]) -> Vec<String> {
    timestamps
        .iter()
        .map(|ts| ts.format(DATE_FORMAT).to_string())
        .collect()
}
