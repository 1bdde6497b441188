//! Synthetic saturation fixtures shared by the criterion benchmarks.

mod fixtures;

pub use fixtures::{
    fixture_timestamps, flat_usage, generate_all_fixtures, linear_fill, near_full, noisy_fill,
    seasonal_fill, SaturationFixture,
};
