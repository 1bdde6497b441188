//! Regression models for the saturation forecaster: three interchangeable
//! quantile gradient boosting families, a robust linear trend stage, and
//! the damped-additive ensemble combining them.

mod ensemble;
mod gbm;
mod tree;
mod trend;

pub use ensemble::{
    temporal_column, DetrendedEnsemble, TrendComponent, TrendSpec, HIGH_QUANTILE, LOW_QUANTILE,
};
pub use gbm::{ClassicParams, GbmFamily, GradientBooster, HistParams, LightParams};
pub use trend::HuberRegressor;
