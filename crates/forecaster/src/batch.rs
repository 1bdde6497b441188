use common::MetricKey;
use tracing::{error, info};

use crate::orchestrator::MetricOrchestrator;
use crate::sources::{ResultSink, SeriesSource};

/// What happened to each metric of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<MetricKey>,
    pub failed: Vec<(MetricKey, String)>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Forecast a batch of metrics strictly sequentially.
///
/// Failures are caught at the per-metric boundary and recorded; one bad
/// metric never aborts its siblings.
pub fn run_batch(
    orchestrator: &MetricOrchestrator,
    source: &dyn SeriesSource,
    sink: &mut dyn ResultSink,
    keys: &[MetricKey],
) -> BatchReport {
    let mut report = BatchReport::default();

    for key in keys {
        match orchestrator.forecast_metric(source, sink, key) {
            Ok(_) => report.succeeded.push(key.clone()),
            Err(err) => {
                error!(metric = %key, %err, "Metric forecast failed");
                report.failed.push((key.clone(), err.to_string()));
            }
        }
    }

    info!(
        total = keys.len(),
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "Batch run finished"
    );

    report
}
