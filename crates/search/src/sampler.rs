use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::{Continuous, Normal};
use tracing::trace;

/// Domain of one numeric search parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamRange {
    pub low: f64,
    pub high: f64,
    /// Sample in log space (for scale-like parameters).
    pub log: bool,
}

impl ParamRange {
    pub const fn uniform(low: f64, high: f64) -> Self {
        Self {
            low,
            high,
            log: false,
        }
    }

    pub const fn log_uniform(low: f64, high: f64) -> Self {
        Self {
            low,
            high,
            log: true,
        }
    }

    fn to_internal(&self, v: f64) -> f64 {
        if self.log {
            v.ln()
        } else {
            v
        }
    }

    fn from_internal(&self, v: f64) -> f64 {
        let value = if self.log { v.exp() } else { v };
        value.clamp(self.low, self.high)
    }

    fn internal_span(&self) -> (f64, f64) {
        (self.to_internal(self.low), self.to_internal(self.high))
    }
}

/// An already-scored observation of one parameter, fed back into the
/// sampler as search history.
#[derive(Debug, Clone, Copy)]
pub struct Observation {
    pub value: f64,
    pub score: f64,
}

/// Tree-structured Parzen estimator, minimization direction.
///
/// The first `n_startup` observations of a parameter are drawn uniformly.
/// After that, history is split into the best `gamma` fraction and the
/// rest; candidates are drawn from a kernel-density estimate of the good
/// values and the one maximizing the good/bad density ratio wins.
/// Deterministic for a fixed seed.
pub struct TpeSampler {
    rng: StdRng,
    n_startup: usize,
    gamma: f64,
    n_candidates: usize,
}

impl TpeSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            n_startup: 10,
            gamma: 0.25,
            n_candidates: 24,
        }
    }

    pub fn sample_numeric(&mut self, range: ParamRange, history: &[Observation]) -> f64 {
        let (lo, hi) = range.internal_span();
        if history.len() < self.n_startup {
            return range.from_internal(self.rng.gen_range(lo..hi));
        }

        let (good, bad) = split_by_score(history, self.gamma);
        let good: Vec<f64> = good.iter().map(|o| range.to_internal(o.value)).collect();
        let bad: Vec<f64> = bad.iter().map(|o| range.to_internal(o.value)).collect();

        let bandwidth = ((hi - lo) / (good.len() as f64).sqrt().max(1.0)).max(1e-12);
        let uniform_floor = 1.0 / (hi - lo).max(1e-12);

        let mut best_value = (lo + hi) / 2.0;
        let mut best_ratio = f64::NEG_INFINITY;
        for _ in 0..self.n_candidates {
            let center = good[self.rng.gen_range(0..good.len())];
            let candidate = match Normal::new(center, bandwidth) {
                Ok(kernel) => kernel.sample(&mut self.rng).clamp(lo, hi),
                Err(_) => self.rng.gen_range(lo..hi),
            };

            let l = kde_density(&good, candidate, bandwidth) + uniform_floor;
            let g = kde_density(&bad, candidate, bandwidth) + uniform_floor;
            let ratio = l / g;
            if ratio > best_ratio {
                best_ratio = ratio;
                best_value = candidate;
            }
        }

        trace!(value = best_value, ratio = best_ratio, "TPE numeric draw");
        range.from_internal(best_value)
    }

    /// Integer parameter on an optionally logarithmic grid.
    pub fn sample_integer(&mut self, range: ParamRange, history: &[Observation]) -> usize {
        self.sample_numeric(range, history).round() as usize
    }

    pub fn sample_categorical(&mut self, n_choices: usize, history: &[Observation]) -> usize {
        if history.len() < self.n_startup {
            return self.rng.gen_range(0..n_choices);
        }

        let (good, _) = split_by_score(history, self.gamma);
        // Smoothed frequency of each choice among the good trials.
        let weights: Vec<f64> = (0..n_choices)
            .map(|c| 1.0 + good.iter().filter(|o| o.value as usize == c).count() as f64)
            .collect();
        match WeightedIndex::new(&weights) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => self.rng.gen_range(0..n_choices),
        }
    }
}

/// Split history into the best `gamma` fraction (by ascending score) and
/// the rest. Both halves are always non-empty.
fn split_by_score(history: &[Observation], gamma: f64) -> (Vec<Observation>, Vec<Observation>) {
    let mut sorted = history.to_vec();
    sorted.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));
    let n_good = ((sorted.len() as f64 * gamma).ceil() as usize)
        .max(1)
        .min(sorted.len() - 1);
    let bad = sorted.split_off(n_good);
    (sorted, bad)
}

fn kde_density(points: &[f64], x: f64, bandwidth: f64) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let total: f64 = points
        .iter()
        .filter_map(|&center| Normal::new(center, bandwidth).ok().map(|k| k.pdf(x)))
        .sum();
    total / points.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observations(values: &[(f64, f64)]) -> Vec<Observation> {
        values
            .iter()
            .map(|&(value, score)| Observation { value, score })
            .collect()
    }

    #[test]
    fn test_startup_phase_stays_in_range() {
        let mut sampler = TpeSampler::new(0);
        let range = ParamRange::uniform(0.0, 1.0);
        for _ in 0..50 {
            let v = sampler.sample_numeric(range, &[]);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_converges_toward_good_region() {
        let mut sampler = TpeSampler::new(7);
        let range = ParamRange::uniform(0.0, 10.0);
        // Good scores cluster near 8, bad scores near 2.
        let history: Vec<Observation> = (0..40)
            .map(|i| {
                let value = if i % 2 == 0 { 8.0 + 0.1 * (i % 5) as f64 } else { 2.0 };
                let score = if i % 2 == 0 { 0.1 } else { 5.0 };
                Observation { value, score }
            })
            .collect();

        let draws: Vec<f64> = (0..20)
            .map(|_| sampler.sample_numeric(range, &history))
            .collect();
        let near_good = draws.iter().filter(|v| **v > 5.0).count();
        assert!(near_good >= 15, "only {near_good}/20 draws near the good region");
    }

    #[test]
    fn test_log_range_respects_bounds() {
        let mut sampler = TpeSampler::new(3);
        let range = ParamRange::log_uniform(50.0, 3000.0);
        let history = observations(&[(100.0, 1.0), (200.0, 0.5), (2500.0, 4.0)]);
        for _ in 0..30 {
            let v = sampler.sample_numeric(range, &history);
            assert!((50.0..=3000.0).contains(&v));
        }
    }

    #[test]
    fn test_categorical_prefers_good_choice() {
        let mut sampler = TpeSampler::new(11);
        // Choice 1 always scores better.
        let history: Vec<Observation> = (0..40)
            .map(|i| Observation {
                value: (i % 2) as f64,
                score: if i % 2 == 1 { 0.1 } else { 3.0 },
            })
            .collect();

        let picks: Vec<usize> = (0..30).map(|_| sampler.sample_categorical(2, &history)).collect();
        let ones = picks.iter().filter(|&&c| c == 1).count();
        assert!(ones > 15, "only {ones}/30 picks of the better category");
    }

    #[test]
    fn test_deterministic_for_fixed_seed() {
        let range = ParamRange::uniform(0.0, 1.0);
        let history = observations(&[(0.2, 1.0), (0.8, 0.1)]);

        let mut a = TpeSampler::new(42);
        let mut b = TpeSampler::new(42);
        for _ in 0..20 {
            assert_eq!(
                a.sample_numeric(range, &history),
                b.sample_numeric(range, &history)
            );
        }
    }
}
