use common::{
    format_dates, BoundKind, ForecastConfig, ForecastError, ForecastOutcome, MetricKey, Result,
};
use features::{FrameBuilder, HorizonFrameBuilder, TrainingFrameBuilder};
use scaler::{FeatureScaler, MinMaxScaler, Scaler};
use search::ModelSearch;
use tracing::{info, info_span};

use crate::sources::{ResultSink, SeriesSource};

/// Runs the full per-metric pipeline: load, preprocess, search-and-fit,
/// resolve saturation, serialize. Each run is independent; nothing is
/// cached between invocations.
#[derive(Debug, Clone)]
pub struct MetricOrchestrator {
    config: ForecastConfig,
}

impl MetricOrchestrator {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast one metric end to end and hand the outcome to the sink.
    ///
    /// Too little history is not an error: the metric gets a neutral
    /// outcome (no forecast, lowest confidence) and the run ends there.
    pub fn forecast_metric(
        &self,
        source: &dyn SeriesSource,
        sink: &mut dyn ResultSink,
        key: &MetricKey,
    ) -> Result<ForecastOutcome> {
        let span = info_span!("forecast", metric = %key);
        let _guard = span.enter();

        // Load
        let series = source.fetch_series(key)?;
        let capacity = source.fetch_capacity_bound(key, BoundKind::Max)?;
        let (host_name, service_name) = display_names(source, key)?;
        let uuid = sink.get_or_create_id(key)?;

        if series.len() < self.config.min_training_points {
            info!(
                points = series.len(),
                required = self.config.min_training_points,
                "Not enough history, writing neutral outcome"
            );
            let outcome = ForecastOutcome::neutral(key, &host_name, &service_name, &uuid);
            sink.write(&uuid, &outcome)?;
            return Ok(outcome);
        }

        // Preprocess: resample, scale the target into capacity ratios,
        // drop flat features, scale the rest.
        let mut frame = TrainingFrameBuilder::new(&series, self.config.frequency_seconds).build()?;
        let target = frame
            .target()
            .ok_or_else(|| ForecastError::InvalidInput("training frame has no target".into()))?
            .to_vec();

        let value_scaler = MinMaxScaler::with_domain(0.0, capacity)?;
        let data_scaled = value_scaler.transform(&target)?;
        let current_saturation = match data_scaled.last() {
            Some(&last) => last,
            None => {
                return Err(ForecastError::InsufficientData(
                    "resampled series is empty".into(),
                ))
            }
        };
        frame.set_target(data_scaled.clone())?;

        let dropped = frame.drop_constant_features();
        if !dropped.is_empty() {
            info!(dropped = ?dropped, "Dropped constant feature columns");
        }
        let retained: Vec<String> = frame.feature_names().to_vec();

        let mut feature_scaler = FeatureScaler::new();
        feature_scaler.fit_transform_frame(&mut frame)?;

        // Search and fit
        let search = ModelSearch::new(self.config.search.clone());
        let outcome = search.run(&frame)?;

        // Predict over the horizon with the training-time scaling replayed
        let last_training = *frame
            .timestamps()
            .last()
            .ok_or_else(|| ForecastError::InsufficientData("training frame is empty".into()))?;
        let mut horizon = HorizonFrameBuilder::after(
            last_training,
            self.config.horizon_hours,
            self.config.frequency_seconds,
        )
        .build()?;
        horizon.select_features(&retained)?;
        feature_scaler.transform_frame(&mut horizon)?;

        let predictions = outcome.model.predict(&horizon.rows())?;

        // Resolve saturation
        let resolution = saturation::resolve(&predictions, horizon.timestamps(), current_saturation)?;

        info!(
            days_to_full = resolution.days_to_full,
            current_saturation,
            grade = outcome.confidence.level(),
            "Forecast complete"
        );

        // Serialize
        let result = ForecastOutcome {
            metric_name: key.metric_name.clone(),
            host_id: key.host_id.clone(),
            host_name,
            service_id: key.service_id.clone(),
            service_name,
            data_dates: format_dates(frame.timestamps()),
            data_scaled,
            forecast: resolution.forecast,
            forecast_dates: format_dates(&resolution.forecast_dates),
            days_to_full: Some(resolution.days_to_full),
            current_saturation: Some(current_saturation),
            saturation_3_months: resolution.saturation_3_months,
            saturation_6_months: resolution.saturation_6_months,
            saturation_12_months: resolution.saturation_12_months,
            confidence_level: outcome.confidence,
            uuid: uuid.clone(),
        };
        sink.write(&uuid, &result)?;

        Ok(result)
    }
}

/// Display names with raw-id fallback.
fn display_names(source: &dyn SeriesSource, key: &MetricKey) -> Result<(String, String)> {
    let (host, service) = source.resolve_display_names(key)?;
    Ok((
        host.unwrap_or_else(|| key.host_id.clone()),
        service.unwrap_or_else(|| key.service_id.clone()),
    ))
}
