use chrono::{Local, NaiveDate};
use thiserror::Error;

pub const DEFAULT_PERIOD_LENGTH_WEEKS: f64 = 1.0;
pub const DEFAULT_THROUGHPUT_SIGMA: f64 = 10.0;
pub const DEFAULT_SIMULATION_COUNT: usize = 10_000;
pub const DEFAULT_MAX_PERIODS_PER_TRIAL: u32 = 10_000;
pub const DEFAULT_PERCENTILES: [f64; 3] = [60.0, 85.0, 95.0];
/// Largest per-trial period bound whose elapsed days (7 per period) still fit
/// in a `u32`.
pub const MAX_PERIODS_PER_TRIAL_LIMIT: u32 = u32::MAX / 7;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("target items must be provided")]
    MissingTarget,
    #[error("target items must be greater than zero, got {0}")]
    NonPositiveTarget(i64),
    #[error("completed items must not be negative, got {0}")]
    NegativeCompleted(i64),
    #[error("completed items ({completed}) must not exceed target items ({target})")]
    CompletedExceedsTarget { completed: i64, target: i64 },
    #[error("period length in weeks must be a positive number, got {0}")]
    InvalidPeriodLength(f64),
    #[error("throughput sigma must be a non-negative number, got {0}")]
    InvalidSigma(f64),
    #[error("simulation count must be greater than zero")]
    ZeroSimulations,
    #[error("maximum periods per trial must be greater than zero")]
    ZeroMaxPeriods,
    #[error(
        "maximum periods per trial must not exceed {limit}, got {0}",
        limit = MAX_PERIODS_PER_TRIAL_LIMIT
    )]
    MaxPeriodsTooLarge(u32),
    #[error("at least one percentile is required")]
    NoPercentiles,
    #[error("percentile must be within 0..=100, got {0}")]
    InvalidPercentile(f64),
    #[error("percentile {0} is listed more than once")]
    DuplicatePercentile(f64),
    #[error("invalid start date: {0} (expected YYYY-MM-DD)")]
    InvalidStartDate(String),
}

/// Raw forecast settings as collected from the command line and config
/// file. Nothing here is trusted until [`ForecastParameters::validate`]
/// turns it into a [`SimulationConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastParameters {
    pub target_items: i64,
    pub completed_items: i64,
    pub period_length_weeks: f64,
    pub throughput_sigma: f64,
    pub start_date: Option<String>,
    pub simulation_count: usize,
    pub percentiles: Vec<f64>,
    pub max_periods_per_trial: u32,
    pub seed: Option<u64>,
}

impl ForecastParameters {
    pub fn new(target_items: i64, completed_items: i64) -> Self {
        Self {
            target_items,
            completed_items,
            period_length_weeks: DEFAULT_PERIOD_LENGTH_WEEKS,
            throughput_sigma: DEFAULT_THROUGHPUT_SIGMA,
            start_date: None,
            simulation_count: DEFAULT_SIMULATION_COUNT,
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            max_periods_per_trial: DEFAULT_MAX_PERIODS_PER_TRIAL,
            seed: None,
        }
    }

    /// Checks every field and builds the immutable configuration used by the
    /// simulation. A missing start date resolves to today's local date.
    pub fn validate(&self) -> Result<SimulationConfig, ValidationError> {
        if self.target_items <= 0 {
            return Err(ValidationError::NonPositiveTarget(self.target_items));
        }
        if self.completed_items < 0 {
            return Err(ValidationError::NegativeCompleted(self.completed_items));
        }
        if self.completed_items > self.target_items {
            return Err(ValidationError::CompletedExceedsTarget {
                completed: self.completed_items,
                target: self.target_items,
            });
        }
        if !self.period_length_weeks.is_finite() || self.period_length_weeks <= 0.0 {
            return Err(ValidationError::InvalidPeriodLength(self.period_length_weeks));
        }
        validate_sigma(self.throughput_sigma)?;
        if self.simulation_count == 0 {
            return Err(ValidationError::ZeroSimulations);
        }
        if self.max_periods_per_trial == 0 {
            return Err(ValidationError::ZeroMaxPeriods);
        }
        if self.max_periods_per_trial > MAX_PERIODS_PER_TRIAL_LIMIT {
            return Err(ValidationError::MaxPeriodsTooLarge(self.max_periods_per_trial));
        }
        if self.percentiles.is_empty() {
            return Err(ValidationError::NoPercentiles);
        }
        if let Some(p) = self
            .percentiles
            .iter()
            .copied()
            .find(|p| !(0.0..=100.0).contains(p))
        {
            return Err(ValidationError::InvalidPercentile(p));
        }
        if let Some(p) = self
            .percentiles
            .iter()
            .enumerate()
            .find(|(i, p)| self.percentiles[..*i].contains(p))
            .map(|(_, p)| *p)
        {
            return Err(ValidationError::DuplicatePercentile(p));
        }

        let base_date = match self.start_date.as_deref() {
            Some(value) if !value.trim().is_empty() => parse_start_date(value)?,
            _ => Local::now().date_naive(),
        };

        Ok(SimulationConfig {
            target_items: self.target_items as u64,
            completed_items: self.completed_items as u64,
            period_length_weeks: self.period_length_weeks,
            throughput_sigma: self.throughput_sigma,
            base_date,
            simulation_count: self.simulation_count,
            percentiles: self.percentiles.clone(),
            max_periods_per_trial: self.max_periods_per_trial,
            seed: self.seed,
        })
    }
}

pub(crate) fn validate_sigma(sigma: f64) -> Result<(), ValidationError> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(ValidationError::InvalidSigma(sigma));
    }
    Ok(())
}

fn parse_start_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidStartDate(value.to_string()))
}

/// Validated forecast configuration. Only obtainable through
/// [`ForecastParameters::validate`], so every instance upholds
/// `0 <= completed_items <= target_items` and the numeric bounds above.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    target_items: u64,
    completed_items: u64,
    period_length_weeks: f64,
    throughput_sigma: f64,
    base_date: NaiveDate,
    simulation_count: usize,
    percentiles: Vec<f64>,
    max_periods_per_trial: u32,
    seed: Option<u64>,
}

impl SimulationConfig {
    pub fn target_items(&self) -> u64 {
        self.target_items
    }

    pub fn completed_items(&self) -> u64 {
        self.completed_items
    }

    pub fn remaining_items(&self) -> u64 {
        self.target_items - self.completed_items
    }

    pub fn period_length_weeks(&self) -> f64 {
        self.period_length_weeks
    }

    pub fn throughput_sigma(&self) -> f64 {
        self.throughput_sigma
    }

    pub fn base_date(&self) -> NaiveDate {
        self.base_date
    }

    pub fn simulation_count(&self) -> usize {
        self.simulation_count
    }

    pub fn percentiles(&self) -> &[f64] {
        &self.percentiles
    }

    pub fn max_periods_per_trial(&self) -> u32 {
        self.max_periods_per_trial
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}
