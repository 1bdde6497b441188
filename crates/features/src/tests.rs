use super::*;

use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use common::RawSeries;

const HOUR: i64 = 3600;

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn hourly_series(values: &[f64]) -> RawSeries {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| (base_time() + Duration::hours(i as i64), v))
        .collect()
}

#[test]
fn test_training_frame_schema() {
    let series = hourly_series(&[1.0, 2.0, 3.0, 4.0]);
    let frame = TrainingFrameBuilder::new(&series, HOUR).build().unwrap();

    assert_eq!(frame.n_rows(), 4);
    let names: Vec<&str> = frame.feature_names().iter().map(String::as_str).collect();
    assert_eq!(names, FEATURE_NAMES);
    assert_eq!(frame.target().unwrap(), &[1.0, 2.0, 3.0, 4.0]);
    // First feature column is the epoch timestamp.
    assert_relative_eq!(
        frame.column(0)[0],
        base_time().and_utc().timestamp() as f64,
        epsilon = 1e-9
    );
}

#[test]
fn test_resample_averages_within_bucket() {
    let mut series = RawSeries::new();
    series.insert(base_time(), 1.0);
    series.insert(base_time() + Duration::minutes(20), 3.0);
    series.insert(base_time() + Duration::hours(1), 10.0);

    let frame = TrainingFrameBuilder::new(&series, HOUR).build().unwrap();
    assert_eq!(frame.n_rows(), 2);
    let target = frame.target().unwrap();
    assert_relative_eq!(target[0], 2.0, epsilon = 1e-12);
    assert_relative_eq!(target[1], 10.0, epsilon = 1e-12);
}

#[test]
fn test_gap_interpolation_is_linear() {
    let mut series = RawSeries::new();
    series.insert(base_time(), 0.0);
    series.insert(base_time() + Duration::hours(4), 8.0);

    let frame = TrainingFrameBuilder::new(&series, HOUR).build().unwrap();
    let target = frame.target().unwrap();
    assert_eq!(target.len(), 5);
    for (i, v) in target.iter().enumerate() {
        assert_relative_eq!(*v, 2.0 * i as f64, epsilon = 1e-12);
    }
}

#[test]
fn test_index_strictly_increasing_after_resample() {
    let series = hourly_series(&[5.0; 24]);
    let frame = TrainingFrameBuilder::new(&series, HOUR).build().unwrap();
    assert!(frame.timestamps().windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_empty_series_is_insufficient_data() {
    let series = RawSeries::new();
    let result = TrainingFrameBuilder::new(&series, HOUR).build();
    assert!(result.is_err());
}

#[test]
fn test_horizon_frame_starts_one_step_after_training() {
    let last = base_time() + Duration::hours(99);
    let frame = HorizonFrameBuilder::after(last, 10, HOUR).build().unwrap();

    assert_eq!(frame.n_rows(), 10);
    assert!(frame.target().is_none());
    assert_eq!(frame.timestamps()[0], last + Duration::hours(1));
    assert_eq!(frame.timestamps()[9], last + Duration::hours(10));
}

#[test]
fn test_calendar_features_weekend_flag() {
    // 2024-01-06 is a Saturday.
    let saturday = NaiveDate::from_ymd_opt(2024, 1, 6)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let frame = HorizonFrameBuilder::new(saturday, 1, HOUR).build().unwrap();

    let names = frame.feature_names();
    let dow_idx = names.iter().position(|n| n == "dayofweek").unwrap();
    let weekend_idx = names.iter().position(|n| n == "weekend").unwrap();
    assert_relative_eq!(frame.column(dow_idx)[0], 5.0, epsilon = 1e-12);
    assert_relative_eq!(frame.column(weekend_idx)[0], 1.0, epsilon = 1e-12);
}

#[test]
fn test_drop_constant_features_threads_names() {
    // One-day span at midnight-aligned hours: minute is constant, hour is not.
    let series = hourly_series(&(0..48).map(|i| i as f64).collect::<Vec<_>>());
    let mut train = TrainingFrameBuilder::new(&series, HOUR).build().unwrap();
    let retained = train.drop_constant_features();

    assert!(!retained.contains(&"minute".to_string()));
    assert!(retained.contains(&"hour".to_string()));
    assert_eq!(train.feature_names(), retained.as_slice());

    // Horizon frame filtered to the same columns, same order.
    let mut horizon = HorizonFrameBuilder::after(base_time() + Duration::hours(47), 5, HOUR)
        .build()
        .unwrap();
    horizon.select_features(&retained).unwrap();
    assert_eq!(horizon.feature_names(), retained.as_slice());
}

#[test]
fn test_select_unknown_feature_fails() {
    let series = hourly_series(&[1.0, 2.0]);
    let mut frame = TrainingFrameBuilder::new(&series, HOUR).build().unwrap();
    assert!(frame.select_features(&["nope".to_string()]).is_err());
}

#[test]
fn test_row_matches_columns() {
    let series = hourly_series(&[1.0, 2.0, 3.0]);
    let frame = TrainingFrameBuilder::new(&series, HOUR).build().unwrap();
    let row = frame.row(1);
    for (j, value) in row.iter().enumerate() {
        assert_relative_eq!(*value, frame.column(j)[1], epsilon = 1e-12);
    }
}
