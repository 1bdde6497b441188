use serde::{Deserialize, Serialize};

/// Per-run forecasting configuration, passed explicitly into the
/// orchestrator. Nothing here is read from ambient environment state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Number of hourly steps to forecast.
    #[serde(default = "default_horizon_hours")]
    pub horizon_hours: usize,

    /// Resampling bucket width in seconds.
    #[serde(default = "default_frequency_seconds")]
    pub frequency_seconds: i64,

    /// Minimum number of resampled points required before a search starts.
    #[serde(default = "default_min_training_points")]
    pub min_training_points: usize,

    #[serde(default)]
    pub search: SearchConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_hours: default_horizon_hours(),
            frequency_seconds: default_frequency_seconds(),
            min_training_points: default_min_training_points(),
            search: SearchConfig::default(),
        }
    }
}

/// Budget and fold layout for the hyperparameter search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of trials; the wall-clock timeout may stop earlier.
    #[serde(default = "default_n_trials")]
    pub n_trials: usize,

    /// Wall-clock budget in seconds for the whole search.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Number of expanding-window cross-validation folds.
    #[serde(default = "default_n_splits")]
    pub n_splits: usize,

    /// Seed for the trial sampler. Fixed so identical inputs reproduce
    /// identical configurations and predictions.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            n_trials: default_n_trials(),
            timeout_seconds: default_timeout_seconds(),
            n_splits: default_n_splits(),
            seed: default_seed(),
        }
    }
}

fn default_horizon_hours() -> usize {
    365 * 24
}
fn default_frequency_seconds() -> i64 {
    3600
}
fn default_min_training_points() -> usize {
    10
}
fn default_n_trials() -> usize {
    1000
}
fn default_timeout_seconds() -> u64 {
    600
}
fn default_n_splits() -> usize {
    5
}
fn default_seed() -> u64 {
    0
}
