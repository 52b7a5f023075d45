use std::ops::Range;
use std::time::Instant;

use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::forecast_config::{ForecastParameters, SimulationConfig, ValidationError};
use crate::domain::throughput::{InputError, ThroughputDataset};
use crate::services::cancellation::{Cancellation, CancelledError};
use crate::services::forecast_config_yaml::ForecastConfigYamlError;
use crate::services::forecast_types::{ForecastPercentile, ForecastResult};
use crate::services::percentiles::{interpolated_sorted, percentile_label};
use crate::services::period_sampler::{BootstrapSampler, ThroughputSampler};
use crate::services::trial_simulation::{SimulationError, TrialBounds, simulate_trial};

/// Trials handed to one rayon task. Batch seeds are drawn up front, so
/// results do not depend on how batches are scheduled.
const TRIALS_PER_BATCH: usize = 256;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),
    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ForecastConfigYamlError),
    #[error("simulation failed: {0}")]
    Simulation(#[from] SimulationError),
    #[error(transparent)]
    Cancelled(#[from] CancelledError),
}

/// Validates `parameters` against an already loaded throughput history and
/// runs the forecast.
pub fn forecast_from_dataset(
    dataset: &ThroughputDataset,
    parameters: &ForecastParameters,
    cancellation: &Cancellation,
) -> Result<(SimulationConfig, ForecastResult), ForecastError> {
    let config = parameters.validate()?;
    let result = run_forecast(dataset, &config, cancellation)?;
    Ok((config, result))
}

pub fn run_forecast(
    dataset: &ThroughputDataset,
    config: &SimulationConfig,
    cancellation: &Cancellation,
) -> Result<ForecastResult, ForecastError> {
    let sampler = BootstrapSampler::new(
        dataset,
        config.period_length_weeks(),
        config.throughput_sigma(),
    )?;
    info!(
        observations = dataset.len(),
        mean_throughput = dataset.mean(),
        "loaded throughput history"
    );
    run_forecast_with_sampler(&sampler, config, cancellation)
}

pub(crate) fn run_forecast_with_sampler<S>(
    sampler: &S,
    config: &SimulationConfig,
    cancellation: &Cancellation,
) -> Result<ForecastResult, ForecastError>
where
    S: ThroughputSampler + Sync,
{
    cancellation.check()?;

    let seed = config
        .seed()
        .unwrap_or_else(|| rand::thread_rng().next_u64());
    let bounds = TrialBounds {
        completed_items: config.completed_items(),
        target_items: config.target_items(),
        max_periods: config.max_periods_per_trial(),
    };

    info!(
        simulations = config.simulation_count(),
        target_items = config.target_items(),
        remaining_items = config.remaining_items(),
        sigma = config.throughput_sigma(),
        period_length_weeks = config.period_length_weeks(),
        seed,
        "running forecast"
    );
    let started = Instant::now();

    let elapsed_days = run_trials(sampler, &bounds, config.simulation_count(), seed, cancellation)
        .inspect_err(|e| warn!(error = %e, "forecast aborted"))?;

    let mut sorted_days = elapsed_days.clone();
    sorted_days.sort_unstable();

    let percentiles = config
        .percentiles()
        .iter()
        .map(|&percentile| percentile_forecast(&sorted_days, percentile, config.base_date()))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        min_days = sorted_days.first().copied().unwrap_or(0),
        max_days = sorted_days.last().copied().unwrap_or(0),
        "forecast finished"
    );

    Ok(ForecastResult::new(
        config.base_date(),
        seed,
        percentiles,
        elapsed_days,
    ))
}

fn run_trials<S>(
    sampler: &S,
    bounds: &TrialBounds,
    simulation_count: usize,
    seed: u64,
    cancellation: &Cancellation,
) -> Result<Vec<u32>, ForecastError>
where
    S: ThroughputSampler + Sync,
{
    let batch_count = simulation_count.div_ceil(TRIALS_PER_BATCH);
    let mut master = StdRng::seed_from_u64(seed);
    let batch_seeds: Vec<u64> = (0..batch_count).map(|_| master.next_u64()).collect();

    let batches = batch_seeds
        .into_par_iter()
        .enumerate()
        .map(|(batch, batch_seed)| {
            let first = batch * TRIALS_PER_BATCH;
            let end = (first + TRIALS_PER_BATCH).min(simulation_count);
            run_batch(sampler, bounds, first..end, batch_seed, cancellation)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(batches.into_iter().flatten().collect())
}

fn run_batch<S: ThroughputSampler>(
    sampler: &S,
    bounds: &TrialBounds,
    trials: Range<usize>,
    batch_seed: u64,
    cancellation: &Cancellation,
) -> Result<Vec<u32>, ForecastError> {
    let mut batch_rng = StdRng::seed_from_u64(batch_seed);
    let mut elapsed_days = Vec::with_capacity(trials.len());
    let first = trials.start;

    for trial in trials {
        cancellation.check()?;
        // One stream per trial keeps each walk independent of how many draws
        // the previous trial in the batch consumed.
        let mut rng = StdRng::seed_from_u64(batch_rng.next_u64());
        let outcome = simulate_trial(trial, bounds, sampler, &mut rng)?;
        elapsed_days.push(outcome.elapsed_days());
    }

    debug!(first_trial = first, trials = elapsed_days.len(), "batch finished");
    Ok(elapsed_days)
}

fn percentile_forecast(
    sorted_days: &[u32],
    percentile: f64,
    base_date: NaiveDate,
) -> Result<ForecastPercentile, SimulationError> {
    let days = interpolated_sorted(sorted_days, percentile).unwrap_or(0.0);
    let date = end_date_from_days(base_date, days)?;
    Ok(ForecastPercentile {
        label: percentile_label(percentile),
        percentile,
        days,
        date,
    })
}

fn end_date_from_days(base_date: NaiveDate, days: f64) -> Result<NaiveDate, SimulationError> {
    base_date
        .checked_add_days(Days::new(days.floor().max(0.0) as u64))
        .ok_or(SimulationError::DateOutOfRange(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedSampler, on_date, parameters_on};
    use std::time::Duration;

    fn dataset(values: &[f64]) -> ThroughputDataset {
        ThroughputDataset::new(values.to_vec()).unwrap()
    }

    fn config(target: i64, completed: i64, sigma: f64, simulations: usize) -> SimulationConfig {
        let mut params = parameters_on(target, completed, "2026-03-02");
        params.throughput_sigma = sigma;
        params.simulation_count = simulations;
        params.seed = Some(42);
        params.validate().unwrap()
    }

    #[test]
    fn deterministic_walk_lands_every_percentile_on_the_same_date() {
        let result = run_forecast(
            &dataset(&[20.0]),
            &config(200, 0, 0.0, 500),
            &Cancellation::new(),
        )
        .unwrap();

        assert_eq!(result.simulation_count(), 500);
        assert!(result.elapsed_days().iter().all(|days| *days == 70));
        let labels: Vec<&str> = result.percentiles().iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["60%", "85%", "95%"]);
        for label in ["60%", "85%", "95%"] {
            assert_eq!(result.date_for(label), Some(on_date(2026, 5, 11)));
        }
        assert_eq!(result.percentiles()[0].days, 70.0);
    }

    #[test]
    fn finished_project_forecasts_the_base_date() {
        let result = run_forecast(
            &dataset(&[3.0, 8.0]),
            &config(40, 40, 10.0, 300),
            &Cancellation::new(),
        )
        .unwrap();

        assert!(result.elapsed_days().iter().all(|days| *days == 0));
        for percentile in result.percentiles() {
            assert_eq!(percentile.date, on_date(2026, 3, 2));
            assert_eq!(percentile.days, 0.0);
        }
    }

    #[test]
    fn percentile_dates_are_ordered() {
        let result = run_forecast(
            &dataset(&[2.0, 5.0, 9.0, 14.0, 0.0, 7.0]),
            &config(120, 10, 4.0, 2_000),
            &Cancellation::new(),
        )
        .unwrap();

        let dates: Vec<NaiveDate> = result.percentiles().iter().map(|p| p.date).collect();
        assert!(dates.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(result.elapsed_days().iter().all(|days| days % 7 == 0));
    }

    #[test]
    fn same_seed_reproduces_the_forecast() {
        let data = dataset(&[2.0, 5.0, 9.0, 14.0]);
        let config = config(150, 0, 10.0, 1_000);

        let first = run_forecast(&data, &config, &Cancellation::new()).unwrap();
        let second = run_forecast(&data, &config, &Cancellation::new()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.seed(), 42);
    }

    #[test]
    fn different_seeds_produce_different_distributions() {
        let data = dataset(&[1.0, 5.0, 9.0, 14.0]);
        let mut params = parameters_on(150, 0, "2026-03-02");
        params.simulation_count = 1_000;
        params.seed = Some(1);
        let first = run_forecast(&data, &params.validate().unwrap(), &Cancellation::new()).unwrap();
        params.seed = Some(2);
        let second = run_forecast(&data, &params.validate().unwrap(), &Cancellation::new()).unwrap();

        assert_ne!(first.elapsed_days(), second.elapsed_days());
    }

    #[test]
    fn unseeded_forecast_reports_the_seed_it_used() {
        let data = dataset(&[2.0, 5.0, 9.0]);
        let mut params = parameters_on(60, 0, "2026-03-02");
        params.simulation_count = 400;
        let first = run_forecast(&data, &params.validate().unwrap(), &Cancellation::new()).unwrap();

        params.seed = Some(first.seed());
        let replay = run_forecast(&data, &params.validate().unwrap(), &Cancellation::new()).unwrap();
        assert_eq!(first, replay);
    }

    #[test]
    fn more_remaining_work_never_moves_dates_earlier() {
        let data = dataset(&[1.0, 4.0, 6.0, 11.0]);
        let mut previous: Option<Vec<NaiveDate>> = None;
        for target in [20, 40, 80, 160] {
            let result = run_forecast(&data, &config(target, 0, 5.0, 800), &Cancellation::new())
                .unwrap();
            let dates: Vec<NaiveDate> = result.percentiles().iter().map(|p| p.date).collect();
            if let Some(previous) = &previous {
                for (before, after) in previous.iter().zip(&dates) {
                    assert!(before <= after);
                }
            }
            previous = Some(dates);
        }
    }

    #[test]
    fn custom_percentiles_keep_their_order() {
        let mut params = parameters_on(100, 0, "2026-03-02");
        params.percentiles = vec![50.0, 97.5, 10.0];
        params.simulation_count = 300;
        params.seed = Some(5);
        let result =
            run_forecast(&dataset(&[10.0]), &params.validate().unwrap(), &Cancellation::new())
                .unwrap();

        let labels: Vec<&str> = result.percentiles().iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["50%", "97.5%", "10%"]);
    }

    #[test]
    fn stalled_walk_aborts_the_whole_batch() {
        let mut params = parameters_on(10, 0, "2026-03-02");
        params.max_periods_per_trial = 50;
        params.simulation_count = 1_000;
        params.throughput_sigma = 0.0;
        let result =
            run_forecast(&dataset(&[0.0]), &params.validate().unwrap(), &Cancellation::new());

        assert!(matches!(
            result,
            Err(ForecastError::Simulation(SimulationError::NonConvergence {
                max_periods: 50,
                ..
            }))
        ));
    }

    #[test]
    fn fixed_sampler_drives_the_aggregation() {
        let config = config(30, 0, 0.0, 600);
        let result =
            run_forecast_with_sampler(&FixedSampler(4.0), &config, &Cancellation::new()).unwrap();
        // 30 / 4 => 8 periods => 56 days
        assert!(result.elapsed_days().iter().all(|days| *days == 56));
        assert_eq!(result.date_for("95%"), Some(on_date(2026, 4, 27)));
    }

    #[test]
    fn cancelled_forecast_returns_no_result() {
        let cancellation = Cancellation::new();
        cancellation.cancel();
        let result = run_forecast(&dataset(&[5.0]), &config(50, 0, 1.0, 100), &cancellation);
        assert!(matches!(
            result,
            Err(ForecastError::Cancelled(CancelledError::Requested))
        ));
    }

    #[test]
    fn expired_deadline_cancels_the_forecast() {
        let cancellation = Cancellation::with_timeout(Duration::ZERO);
        let result = run_forecast(&dataset(&[5.0]), &config(50, 0, 1.0, 100), &cancellation);
        assert!(matches!(
            result,
            Err(ForecastError::Cancelled(CancelledError::DeadlineExceeded))
        ));
    }

    #[test]
    fn forecast_from_dataset_validates_before_simulating() {
        let cancellation = Cancellation::new();
        cancellation.cancel();
        let result = forecast_from_dataset(
            &dataset(&[5.0]),
            &parameters_on(10, 11, "2026-03-02"),
            &cancellation,
        );
        assert!(matches!(
            result,
            Err(ForecastError::Validation(
                ValidationError::CompletedExceedsTarget { .. }
            ))
        ));
    }

    #[test]
    fn forecast_from_dataset_returns_the_validated_config() {
        let (config, result) = forecast_from_dataset(
            &dataset(&[20.0]),
            &parameters_on(200, 0, "2026-03-02"),
            &Cancellation::new(),
        )
        .unwrap();
        assert_eq!(config.remaining_items(), 200);
        assert_eq!(result.base_date(), config.base_date());
    }

    #[test]
    fn end_date_floors_fractional_days() {
        let base = on_date(2026, 3, 2);
        assert_eq!(end_date_from_days(base, 76.65).unwrap(), on_date(2026, 5, 17));
        assert_eq!(end_date_from_days(base, 0.0).unwrap(), base);
    }

    #[test]
    fn end_date_reports_calendar_overflow() {
        let result = end_date_from_days(NaiveDate::MAX, 7.0);
        assert_eq!(result, Err(SimulationError::DateOutOfRange(7.0)));
    }
}
