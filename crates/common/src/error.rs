use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    /// Fewer training points than the pipeline can work with. Non-fatal at
    /// the orchestrator boundary: the metric gets a neutral outcome.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// The upstream time-series store has no points or no capacity bound
    /// for the requested identity. Propagated, never retried here.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// Every search trial was pruned or failed. Fatal for the metric's run.
    #[error("search exhausted without result: {0}")]
    SearchExhausted(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("model error: {0}")]
    ModelError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ForecastError>;
