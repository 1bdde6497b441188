use chrono::NaiveDateTime;
use common::RawSeries;

/// A synthetic metric history with a known capacity bound.
#[derive(Debug, Clone)]
pub struct SaturationFixture {
    pub name: String,
    pub series: RawSeries,
    pub capacity: f64,
    /// Whether the series, extended at its current pace, hits the
    /// capacity within a year.
    pub expect_saturation: bool,
}

/// Standard fixtures across the saturation patterns worth measuring.
pub fn generate_all_fixtures() -> Vec<SaturationFixture> {
    let mut fixtures = Vec::new();
    for &length in &[200, 500, 1000] {
        fixtures.push(linear_fill(length));
        fixtures.push(noisy_fill(length));
        fixtures.push(seasonal_fill(length));
        fixtures.push(flat_usage(length));
        fixtures.push(near_full(length));
    }
    fixtures
}

fn make_series(values: &[f64]) -> RawSeries {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| (base + chrono::Duration::hours(i as i64), v))
        .collect()
}

/// Deterministic pseudo-random: simple LCG-based noise in [-amplitude, amplitude].
fn noise(seed: u64, n: usize, amplitude: f64) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            // LCG parameters (Numerical Recipes)
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let frac = ((state >> 33) as f64) / (u32::MAX as f64); // 0..1
            (frac * 2.0 - 1.0) * amplitude
        })
        .collect()
}

/// Disk filling at a steady unit-per-hour pace toward twice its current level.
pub fn linear_fill(n: usize) -> SaturationFixture {
    let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
    SaturationFixture {
        name: format!("linear_fill_{n}"),
        series: make_series(&values),
        capacity: 2.0 * n as f64,
        expect_saturation: true,
    }
}

pub fn noisy_fill(n: usize) -> SaturationFixture {
    let ns = noise(42, n, 0.05 * n as f64);
    let values: Vec<f64> = (0..n).map(|i| i as f64 + ns[i]).collect();
    SaturationFixture {
        name: format!("noisy_fill_{n}"),
        series: make_series(&values),
        capacity: 2.0 * n as f64,
        expect_saturation: true,
    }
}

/// Daily usage cycle riding on a slow fill.
pub fn seasonal_fill(n: usize) -> SaturationFixture {
    let values: Vec<f64> = (0..n)
        .map(|i| {
            0.5 * i as f64
                + 0.1 * n as f64 * (2.0 * std::f64::consts::PI * i as f64 / 24.0).sin()
                + 0.2 * n as f64
        })
        .collect();
    SaturationFixture {
        name: format!("seasonal_fill_{n}"),
        series: make_series(&values),
        capacity: 2.0 * n as f64,
        expect_saturation: true,
    }
}

pub fn flat_usage(n: usize) -> SaturationFixture {
    let ns = noise(7, n, 1.0);
    let values: Vec<f64> = (0..n).map(|i| 50.0 + ns[i]).collect();
    SaturationFixture {
        name: format!("flat_usage_{n}"),
        series: make_series(&values),
        capacity: 100.0,
        expect_saturation: false,
    }
}

/// Already sitting a hair under the bound.
pub fn near_full(n: usize) -> SaturationFixture {
    let values: Vec<f64> = (0..n).map(|i| 990.0 + 0.005 * i as f64).collect();
    SaturationFixture {
        name: format!("near_full_{n}"),
        series: make_series(&values),
        capacity: 1000.0,
        expect_saturation: true,
    }
}

/// Timestamps shared by every fixture of length `n`.
pub fn fixture_timestamps(n: usize) -> Vec<NaiveDateTime> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| base + chrono::Duration::hours(i as i64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_cover_all_patterns_and_lengths() {
        let fixtures = generate_all_fixtures();
        assert_eq!(fixtures.len(), 15);
        for fixture in &fixtures {
            assert!(!fixture.series.is_empty());
            assert!(fixture.capacity > 0.0);
            let max = fixture
                .series
                .values()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max);
            assert!(max <= fixture.capacity, "{} exceeds capacity", fixture.name);
        }
    }

    #[test]
    fn noise_is_deterministic() {
        assert_eq!(noise(42, 16, 1.0), noise(42, 16, 1.0));
    }
}
