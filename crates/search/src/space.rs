use std::collections::HashMap;

use common::{ForecastError, Result};
use models::{ClassicParams, GbmFamily, HistParams, LightParams, TrendSpec};

use crate::sampler::{Observation, ParamRange, TpeSampler};
use crate::search::TrialRecord;

// Parameter names, also the keys of a trial's encoded form.
const FAMILY: &str = "family";
const QUANTILE: &str = "quantile";
const DETREND: &str = "detrend";
const DAMPING: &str = "damping";
const HUBER_EPSILON: &str = "huber_epsilon";
const LIGHT_LEARNING_RATE: &str = "light_learning_rate";
const LIGHT_ROUNDS: &str = "light_rounds";
const LIGHT_L1: &str = "light_l1";
const LIGHT_L2: &str = "light_l2";
const CLASSIC_LEARNING_RATE: &str = "classic_learning_rate";
const CLASSIC_ROUNDS: &str = "classic_rounds";
const HIST_LEARNING_RATE: &str = "hist_learning_rate";
const HIST_ROUNDS: &str = "hist_rounds";

const QUANTILE_RANGE: ParamRange = ParamRange::uniform(0.01, 0.99);
const DAMPING_RANGE: ParamRange = ParamRange::uniform(-1.0, 1.0);
const HUBER_EPSILON_RANGE: ParamRange = ParamRange::log_uniform(1.0, 1000.0);
const LIGHT_LEARNING_RATE_RANGE: ParamRange = ParamRange::log_uniform(1e-4, 1.0);
const LIGHT_ROUNDS_RANGE: ParamRange = ParamRange::log_uniform(50.0, 3000.0);
const LIGHT_L1_RANGE: ParamRange = ParamRange::uniform(0.0, 10.0);
const LIGHT_L2_RANGE: ParamRange = ParamRange::uniform(0.0, 100.0);
const CLASSIC_LEARNING_RATE_RANGE: ParamRange = ParamRange::log_uniform(1e-3, 0.5);
const CLASSIC_ROUNDS_RANGE: ParamRange = ParamRange::log_uniform(50.0, 1000.0);
const HIST_LEARNING_RATE_RANGE: ParamRange = ParamRange::log_uniform(1e-3, 0.5);
const HIST_ROUNDS_RANGE: ParamRange = ParamRange::log_uniform(50.0, 1000.0);

/// One trial's typed configuration: a regressor family (with its
/// family-specific hyperparameters) and the optional trend-removal stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialParams {
    pub family: GbmFamily,
    pub trend: Option<TrendSpec>,
}

/// Draw a full trial configuration and its encoded form for the history.
/// Family-conditional parameters are only recorded when their branch is
/// active, so each parameter's history stays meaningful.
pub(crate) fn sample_trial(
    sampler: &mut TpeSampler,
    history: &[TrialRecord],
) -> (TrialParams, HashMap<String, f64>) {
    let mut encoded = HashMap::new();

    let family_idx = sampler.sample_categorical(3, &observations(history, FAMILY));
    encoded.insert(FAMILY.to_string(), family_idx as f64);

    let quantile = sampler.sample_numeric(QUANTILE_RANGE, &observations(history, QUANTILE));
    encoded.insert(QUANTILE.to_string(), quantile);

    let family = match family_idx {
        0 => {
            let learning_rate = sampler.sample_numeric(
                LIGHT_LEARNING_RATE_RANGE,
                &observations(history, LIGHT_LEARNING_RATE),
            );
            let n_rounds =
                sampler.sample_integer(LIGHT_ROUNDS_RANGE, &observations(history, LIGHT_ROUNDS));
            let l1 = sampler.sample_numeric(LIGHT_L1_RANGE, &observations(history, LIGHT_L1));
            let l2 = sampler.sample_numeric(LIGHT_L2_RANGE, &observations(history, LIGHT_L2));
            encoded.insert(LIGHT_LEARNING_RATE.to_string(), learning_rate);
            encoded.insert(LIGHT_ROUNDS.to_string(), n_rounds as f64);
            encoded.insert(LIGHT_L1.to_string(), l1);
            encoded.insert(LIGHT_L2.to_string(), l2);
            GbmFamily::Light(LightParams {
                quantile,
                learning_rate,
                n_rounds,
                l1,
                l2,
            })
        }
        1 => {
            let learning_rate = sampler.sample_numeric(
                CLASSIC_LEARNING_RATE_RANGE,
                &observations(history, CLASSIC_LEARNING_RATE),
            );
            let n_rounds = sampler
                .sample_integer(CLASSIC_ROUNDS_RANGE, &observations(history, CLASSIC_ROUNDS));
            encoded.insert(CLASSIC_LEARNING_RATE.to_string(), learning_rate);
            encoded.insert(CLASSIC_ROUNDS.to_string(), n_rounds as f64);
            GbmFamily::Classic(ClassicParams {
                quantile,
                learning_rate,
                n_rounds,
            })
        }
        _ => {
            let learning_rate = sampler.sample_numeric(
                HIST_LEARNING_RATE_RANGE,
                &observations(history, HIST_LEARNING_RATE),
            );
            let n_rounds =
                sampler.sample_integer(HIST_ROUNDS_RANGE, &observations(history, HIST_ROUNDS));
            encoded.insert(HIST_LEARNING_RATE.to_string(), learning_rate);
            encoded.insert(HIST_ROUNDS.to_string(), n_rounds as f64);
            GbmFamily::Hist(HistParams {
                quantile,
                learning_rate,
                n_rounds,
            })
        }
    };

    let detrend = sampler.sample_categorical(2, &observations(history, DETREND)) == 1;
    encoded.insert(DETREND.to_string(), if detrend { 1.0 } else { 0.0 });

    let trend = if detrend {
        // Damping moves on a 0.01 grid.
        let damping =
            (sampler.sample_numeric(DAMPING_RANGE, &observations(history, DAMPING)) / 0.01).round()
                * 0.01;
        let huber_epsilon =
            sampler.sample_numeric(HUBER_EPSILON_RANGE, &observations(history, HUBER_EPSILON));
        encoded.insert(DAMPING.to_string(), damping);
        encoded.insert(HUBER_EPSILON.to_string(), huber_epsilon);
        Some(TrendSpec {
            damping,
            huber_epsilon,
        })
    } else {
        None
    };

    (TrialParams { family, trend }, encoded)
}

/// Rebuild the typed configuration from a recorded trial.
pub(crate) fn decode_trial(encoded: &HashMap<String, f64>) -> Result<TrialParams> {
    let get = |name: &str| {
        encoded
            .get(name)
            .copied()
            .ok_or_else(|| ForecastError::InvalidInput(format!("missing trial parameter: {name}")))
    };

    let quantile = get(QUANTILE)?;
    let family = match get(FAMILY)? as usize {
        0 => GbmFamily::Light(LightParams {
            quantile,
            learning_rate: get(LIGHT_LEARNING_RATE)?,
            n_rounds: get(LIGHT_ROUNDS)? as usize,
            l1: get(LIGHT_L1)?,
            l2: get(LIGHT_L2)?,
        }),
        1 => GbmFamily::Classic(ClassicParams {
            quantile,
            learning_rate: get(CLASSIC_LEARNING_RATE)?,
            n_rounds: get(CLASSIC_ROUNDS)? as usize,
        }),
        _ => GbmFamily::Hist(HistParams {
            quantile,
            learning_rate: get(HIST_LEARNING_RATE)?,
            n_rounds: get(HIST_ROUNDS)? as usize,
        }),
    };

    let trend = if get(DETREND)? == 1.0 {
        Some(TrendSpec {
            damping: get(DAMPING)?,
            huber_epsilon: get(HUBER_EPSILON)?,
        })
    } else {
        None
    };

    Ok(TrialParams { family, trend })
}

fn observations(history: &[TrialRecord], name: &str) -> Vec<Observation> {
    history
        .iter()
        .filter_map(|trial| {
            trial.params.get(name).map(|&value| Observation {
                value,
                score: trial.score,
            })
        })
        .collect()
}
