use std::collections::HashMap;
use std::time::{Duration, Instant};

use common::metrics::{mase, std_dev};
use common::{ConfidenceGrade, ForecastError, Result, SearchConfig};
use features::FeatureFrame;
use models::{temporal_column, DetrendedEnsemble, GradientBooster, TrendComponent};
use tracing::{debug, info};

use crate::cv::TimeSeriesSplit;
use crate::pruner::SuccessiveHalvingPruner;
use crate::sampler::TpeSampler;
use crate::space::{decode_trial, sample_trial, TrialParams};

/// Below this score the model graded `High`, below [`GRADE_FAIR_BELOW`]
/// it grades `Fair`, otherwise `Low`. The score is
/// `ln(1 + ln(1 + error) · ln(1 + std))`.
pub const GRADE_HIGH_BELOW: f64 = 0.37;
pub const GRADE_FAIR_BELOW: f64 = 3.0;

/// One completed trial: its position in the search, the cross-validation
/// score (mean MASE over folds), the per-fold spread, and the encoded
/// parameters the sampler conditions on.
#[derive(Debug, Clone)]
pub struct TrialRecord {
    pub number: usize,
    pub score: f64,
    pub fold_std: f64,
    pub params: HashMap<String, f64>,
}

/// Result of a completed hyperparameter search: the refitted winning
/// ensemble plus enough bookkeeping to judge and log it.
#[derive(Debug)]
pub struct SearchOutcome {
    pub model: DetrendedEnsemble,
    pub confidence: ConfidenceGrade,
    pub best_score: f64,
    pub best_std: f64,
    pub trials_completed: usize,
    pub trials_pruned: usize,
}

/// Sequential trial loop over the model space: sample a configuration,
/// score it with expanding-window cross-validation, prune the hopeless
/// ones early, and refit the winner on the full history.
#[derive(Debug, Clone)]
pub struct ModelSearch {
    config: SearchConfig,
}

impl ModelSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, frame: &FeatureFrame) -> Result<SearchOutcome> {
        let y = frame
            .target()
            .ok_or_else(|| ForecastError::InvalidInput("training frame has no target".into()))?;
        let x = frame.rows();
        let n = x.len();

        let splitter = TimeSeriesSplit::new(n, self.config.n_splits)?;
        let folds = splitter.split(n);

        let mut sampler = TpeSampler::new(self.config.seed);
        let mut pruner = SuccessiveHalvingPruner::new();
        let deadline = Instant::now() + Duration::from_secs(self.config.timeout_seconds);
        let mut records: Vec<TrialRecord> = Vec::new();
        let mut pruned = 0usize;

        for number in 0..self.config.n_trials {
            if Instant::now() >= deadline {
                info!(
                    completed = records.len(),
                    pruned, "Search budget exhausted before trial limit"
                );
                break;
            }

            let (params, encoded) = sample_trial(&mut sampler, &records);
            let mut fold_scores = Vec::with_capacity(folds.len());
            let mut survived = true;

            for fold in &folds {
                if Instant::now() >= deadline {
                    survived = false;
                    break;
                }
                let train_x = &x[fold.train.clone()];
                let train_y = &y[fold.train.clone()];
                let valid_x = &x[fold.valid.clone()];
                let valid_y = &y[fold.valid.clone()];

                let score = match evaluate_fold(&params, train_x, train_y, valid_x) {
                    Ok(preds) => mase(&preds, valid_y, train_y),
                    Err(err) => {
                        debug!(trial = number, %err, "Fold evaluation failed");
                        survived = false;
                        break;
                    }
                };
                fold_scores.push(score);

                let running_mean = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
                if pruner.observe(fold_scores.len(), running_mean) {
                    survived = false;
                    break;
                }
            }

            if !survived || fold_scores.len() < folds.len() {
                pruned += 1;
                continue;
            }

            let score = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
            let fold_std = std_dev(&fold_scores);
            debug!(trial = number, score, fold_std, "Trial completed");
            records.push(TrialRecord {
                number,
                score,
                fold_std,
                params: encoded,
            });
        }

        let best = records
            .iter()
            .min_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or_else(|| {
                ForecastError::SearchExhausted(format!(
                    "no trial finished within budget ({pruned} pruned)"
                ))
            })?;

        let params = decode_trial(&best.params)?;
        let model = DetrendedEnsemble::fit(params.family, params.trend, &x, y)?;
        let confidence = confidence_grade(best.score, best.fold_std);

        info!(
            trial = best.number,
            family = model.family().name(),
            score = best.score,
            std = best.fold_std,
            grade = u8::from(confidence),
            completed = records.len(),
            pruned,
            "Selected model"
        );

        Ok(SearchOutcome {
            model,
            confidence,
            best_score: best.score,
            best_std: best.fold_std,
            trials_completed: records.len(),
            trials_pruned: pruned,
        })
    }
}

fn evaluate_fold(
    params: &TrialParams,
    train_x: &[Vec<f64>],
    train_y: &[f64],
    valid_x: &[Vec<f64>],
) -> Result<Vec<f64>> {
    match params.trend {
        Some(spec) => {
            let temporal = temporal_column(train_x);
            let trend = TrendComponent::fit(spec, &temporal, train_y)?;
            let residual = trend.detrend(&temporal, train_y)?;
            let booster = GradientBooster::fit(&params.family, train_x, &residual)?;
            let mut preds = booster.predict(valid_x);
            let contribution = trend.contribution(&temporal_column(valid_x))?;
            for (p, c) in preds.iter_mut().zip(&contribution) {
                *p += c;
            }
            Ok(preds)
        }
        None => Ok(GradientBooster::fit(&params.family, train_x, train_y)?.predict(valid_x)),
    }
}

/// Squash cross-validation error and spread into a single stability
/// score and bucket it into a grade.
pub fn confidence_grade(error: f64, std: f64) -> ConfidenceGrade {
    let score = (1.0 + (1.0 + error).ln() * (1.0 + std).ln()).ln();
    if !score.is_finite() {
        ConfidenceGrade::Low
    } else if score < GRADE_HIGH_BELOW {
        ConfidenceGrade::High
    } else if score < GRADE_FAIR_BELOW {
        ConfidenceGrade::Fair
    } else {
        ConfidenceGrade::Low
    }
}

#[cfg(test)]
mod tests;
