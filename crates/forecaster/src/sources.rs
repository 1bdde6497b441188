use common::{BoundKind, ForecastOutcome, MetricKey, RawSeries, Result};

/// Read side of the surrounding platform: raw series, capacity bounds
/// and display names for one metric identity.
///
/// Implementations talk to whatever time-series store the deployment
/// uses; the pipeline only sees this contract.
pub trait SeriesSource {
    /// Full raw history for the metric. `DataUnavailable` when the
    /// store has no points for this identity.
    fn fetch_series(&self, key: &MetricKey) -> Result<RawSeries>;

    /// The permissible bound for the metric, fetched once per run.
    /// `DataUnavailable` when no bound is registered.
    fn fetch_capacity_bound(&self, key: &MetricKey, which: BoundKind) -> Result<f64>;

    /// Human-readable `(host, service)` names; `None` entries mean no
    /// display name is registered and the raw id should be used.
    fn resolve_display_names(&self, key: &MetricKey)
        -> Result<(Option<String>, Option<String>)>;
}

/// Write side: where finished outcomes go.
pub trait ResultSink {
    /// Stable opaque identifier for `(organization, metric_name,
    /// host_id, service_id)`, created on first use. Must be idempotent.
    fn get_or_create_id(&mut self, key: &MetricKey) -> Result<String>;

    fn write(&mut self, id: &str, outcome: &ForecastOutcome) -> Result<()>;
}
