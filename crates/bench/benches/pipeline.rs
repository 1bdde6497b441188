//! Benchmarks for the per-metric pipeline stages.
//!
//! Covers: resampling + feature building, scaling, single ensemble fit,
//! a small hyperparameter search, and the saturation scan.

use bench::{linear_fill, noisy_fill};
use common::SearchConfig;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use features::{FrameBuilder, HorizonFrameBuilder, TrainingFrameBuilder};
use models::{DetrendedEnsemble, GbmFamily, HistParams, TrendSpec};
use scaler::{FeatureScaler, MinMaxScaler, Scaler};
use search::ModelSearch;

fn prepared_frame(n: usize) -> features::FeatureFrame {
    let fixture = noisy_fill(n);
    let mut frame = TrainingFrameBuilder::new(&fixture.series, 3600)
        .build()
        .unwrap();
    let scaler = MinMaxScaler::with_domain(0.0, fixture.capacity).unwrap();
    let target = scaler.transform(frame.target().unwrap()).unwrap();
    frame.set_target(target).unwrap();
    frame.drop_constant_features();
    FeatureScaler::new().fit_transform_frame(&mut frame).unwrap();
    frame
}

fn bench_feature_building(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_building");
    for n in [200, 1000, 5000] {
        let fixture = linear_fill(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &fixture, |b, f| {
            b.iter(|| TrainingFrameBuilder::new(black_box(&f.series), 3600).build())
        });
    }
    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let fixture = noisy_fill(1000);
    let frame = TrainingFrameBuilder::new(&fixture.series, 3600)
        .build()
        .unwrap();
    c.bench_function("feature_scaling_1000", |b| {
        b.iter(|| {
            let mut work = frame.clone();
            FeatureScaler::new().fit_transform_frame(black_box(&mut work))
        })
    });
}

fn bench_ensemble_fit(c: &mut Criterion) {
    let frame = prepared_frame(500);
    let x = frame.rows();
    let y = frame.target().unwrap().to_vec();
    let family = GbmFamily::Hist(HistParams {
        quantile: 0.5,
        learning_rate: 0.1,
        n_rounds: 100,
    });
    let trend = Some(TrendSpec {
        damping: 1.0,
        huber_epsilon: 1.35,
    });

    c.bench_function("ensemble_fit_500", |b| {
        b.iter(|| DetrendedEnsemble::fit(black_box(family), trend, &x, &y))
    });
}

fn bench_small_search(c: &mut Criterion) {
    let frame = prepared_frame(200);
    let config = SearchConfig {
        n_trials: 3,
        timeout_seconds: 120,
        n_splits: 3,
        seed: 0,
    };

    let mut group = c.benchmark_group("model_search");
    group.sample_size(10);
    group.bench_function("3_trials_200_points", |b| {
        b.iter(|| ModelSearch::new(config.clone()).run(black_box(&frame)))
    });
    group.finish();
}

fn bench_saturation_scan(c: &mut Criterion) {
    let horizon = HorizonFrameBuilder::new(
        chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        365 * 24,
        3600,
    )
    .build()
    .unwrap();
    let timestamps = horizon.timestamps().to_vec();
    let predictions: Vec<f64> = (0..timestamps.len())
        .map(|i| 0.3 + i as f64 * 1e-4)
        .collect();

    c.bench_function("saturation_scan_1y", |b| {
        b.iter(|| saturation::resolve(black_box(&predictions), &timestamps, 0.3))
    });
}

criterion_group!(
    benches,
    bench_feature_building,
    bench_scaling,
    bench_ensemble_fit,
    bench_small_search,
    bench_saturation_scan
);
criterion_main!(benches);
