use std::ops::Range;

use common::{ForecastError, Result};

/// One expanding-window fold: the validation block is always
/// chronologically after its training block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Range<usize>,
    pub valid: Range<usize>,
}

/// Time-ordered cross-validation splits. No shuffling: fold `k` trains on
/// everything before its validation block, and successive folds extend
/// the training window by one validation block.
#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesSplit {
    n_splits: usize,
    test_size: usize,
}

impl TimeSeriesSplit {
    /// Validation blocks are a tenth of the series, matching the search's
    /// train/validate proportions.
    pub fn new(n_samples: usize, n_splits: usize) -> Result<Self> {
        if n_splits == 0 {
            return Err(ForecastError::ConfigError(
                "cross-validation needs at least one fold".into(),
            ));
        }
        let test_size = (n_samples / 10).max(1);
        let first_train_end = n_samples.saturating_sub(n_splits * test_size);
        if first_train_end < 2 {
            return Err(ForecastError::InsufficientData(format!(
                "{n_samples} samples cannot support {n_splits} folds of size {test_size}"
            )));
        }
        Ok(Self { n_splits, test_size })
    }

    pub fn split(&self, n_samples: usize) -> Vec<Fold> {
        let mut folds = Vec::with_capacity(self.n_splits);
        for k in 0..self.n_splits {
            let valid_end = n_samples - (self.n_splits - 1 - k) * self.test_size;
            let valid_start = valid_end - self.test_size;
            folds.push(Fold {
                train: 0..valid_start,
                valid: valid_start..valid_end,
            });
        }
        folds
    }
}
