//! Per-metric forecasting pipeline: fetch history and capacity through
//! the [`SeriesSource`] contract, preprocess, search-and-fit, resolve
//! the saturation horizon, and write the outcome through [`ResultSink`].

mod batch;
mod orchestrator;
mod sources;

pub use batch::{run_batch, BatchReport};
pub use orchestrator::MetricOrchestrator;
pub use sources::{ResultSink, SeriesSource};
