//! Hyperparameter search for the quantile ensembles: a tree-structured
//! Parzen estimator over the model space, expanding-window time-series
//! cross-validation, and successive-halving pruning of weak trials.

mod cv;
mod pruner;
mod sampler;
mod search;
mod space;

pub use cv::{Fold, TimeSeriesSplit};
pub use pruner::SuccessiveHalvingPruner;
pub use sampler::{Observation, ParamRange, TpeSampler};
pub use search::{
    confidence_grade, ModelSearch, SearchOutcome, TrialRecord, GRADE_FAIR_BELOW, GRADE_HIGH_BELOW,
};
pub use space::TrialParams;
