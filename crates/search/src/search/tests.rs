use approx::assert_relative_eq;
use chrono::NaiveDate;
use common::{ConfidenceGrade, ForecastError, RawSeries, SearchConfig};
use features::{FrameBuilder, HorizonFrameBuilder, TrainingFrameBuilder};

use super::*;

fn hourly_series(values: &[f64]) -> RawSeries {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| (start + chrono::Duration::hours(i as i64), v))
        .collect()
}

fn training_frame(values: &[f64]) -> features::FeatureFrame {
    let series = hourly_series(values);
    TrainingFrameBuilder::new(&series, 3600).build().unwrap()
}

fn quick_config(n_trials: usize) -> SearchConfig {
    SearchConfig {
        n_trials,
        timeout_seconds: 120,
        n_splits: 3,
        seed: 0,
    }
}

#[test]
fn finds_a_model_on_trending_data() {
    let values: Vec<f64> = (0..120).map(|i| i as f64 * 0.5).collect();
    let frame = training_frame(&values);

    let outcome = ModelSearch::new(quick_config(4)).run(&frame).unwrap();

    assert!(outcome.trials_completed >= 1);
    assert!(outcome.best_score.is_finite());

    let horizon = HorizonFrameBuilder::after(*frame.timestamps().last().unwrap(), 12, 3600)
        .build()
        .unwrap();
    let preds = outcome.model.predict(&horizon.rows()).unwrap();
    assert_eq!(preds.len(), 12);
    assert!(preds.iter().all(|p| p.is_finite()));
}

#[test]
fn identical_seeds_reproduce_the_search() {
    let values: Vec<f64> = (0..100)
        .map(|i| (i as f64 * 0.3) + ((i % 7) as f64))
        .collect();
    let frame = training_frame(&values);

    let first = ModelSearch::new(quick_config(3)).run(&frame).unwrap();
    let second = ModelSearch::new(quick_config(3)).run(&frame).unwrap();

    assert_eq!(first.model.family().name(), second.model.family().name());
    assert_relative_eq!(first.best_score, second.best_score);

    let horizon = HorizonFrameBuilder::after(*frame.timestamps().last().unwrap(), 6, 3600)
        .build()
        .unwrap();
    let a = first.model.predict(&horizon.rows()).unwrap();
    let b = second.model.predict(&horizon.rows()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn constant_series_exhausts_the_search() {
    // A flat target makes the naive-baseline MASE denominator zero, so
    // every fold scores infinite and every trial is pruned.
    let frame = training_frame(&vec![5.0; 80]);

    let err = ModelSearch::new(quick_config(3)).run(&frame).unwrap_err();
    assert!(matches!(err, ForecastError::SearchExhausted(_)));
}

#[test]
fn too_few_samples_is_rejected() {
    let values: Vec<f64> = (0..6).map(|i| i as f64).collect();
    let frame = training_frame(&values);

    let err = ModelSearch::new(quick_config(2)).run(&frame).unwrap_err();
    assert!(matches!(err, ForecastError::InsufficientData(_)));
}

#[test]
fn grade_boundaries() {
    assert_eq!(confidence_grade(0.9, 0.9), ConfidenceGrade::High);
    assert_eq!(confidence_grade(1.0, 1.0), ConfidenceGrade::Fair);
    assert_eq!(confidence_grade(75.0, 75.0), ConfidenceGrade::Fair);
    assert_eq!(confidence_grade(80.0, 80.0), ConfidenceGrade::Low);
    assert_eq!(confidence_grade(f64::INFINITY, 1.0), ConfidenceGrade::Low);
}

#[test]
fn zero_error_grades_high() {
    assert_eq!(confidence_grade(0.0, 0.0), ConfidenceGrade::High);
}
