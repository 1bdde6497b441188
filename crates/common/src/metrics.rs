/// Mean Absolute Error between a forecast and the observed values.
pub fn mae(forecast: &[f64], actual: &[f64]) -> f64 {
    debug_assert_eq!(forecast.len(), actual.len());
    if forecast.is_empty() {
        return 0.0;
    }
    forecast
        .iter()
        .zip(actual)
        .map(|(f, a)| (f - a).abs())
        .sum::<f64>()
        / forecast.len() as f64
}

/// Mean Absolute Scaled Error.
///
/// Scales the forecast MAE by the in-sample MAE of the one-step naive
/// forecast, making scores comparable across metrics of different
/// magnitudes. MASE < 1 beats the naive baseline.
pub fn mase(forecast: &[f64], actual: &[f64], train_values: &[f64]) -> f64 {
    debug_assert_eq!(forecast.len(), actual.len());
    if forecast.is_empty() {
        return f64::INFINITY;
    }

    if train_values.len() < 2 {
        // No naive baseline available; fall back to MAE relative to the
        // mean magnitude of the validation block.
        let mean_abs = actual.iter().map(|a| a.abs()).sum::<f64>() / actual.len() as f64;
        return if mean_abs > 1e-15 {
            mae(forecast, actual) / mean_abs
        } else {
            f64::INFINITY
        };
    }

    let naive_mae = train_values
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .sum::<f64>()
        / (train_values.len() - 1) as f64;

    if naive_mae < 1e-15 {
        return f64::INFINITY;
    }

    mae(forecast, actual) / naive_mae
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}

/// Empirical quantile with linear interpolation between order statistics.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}
