use rand::Rng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Normal};

use crate::domain::forecast_config::{ValidationError, validate_sigma};
use crate::domain::throughput::ThroughputDataset;

/// Produces the amount of work finished in one simulated period.
pub trait ThroughputSampler {
    fn sample_increment<R: Rng + ?Sized>(&self, rng: &mut R) -> f64;
}

/// Bootstraps a historical throughput value, scales it to a weekly rate and
/// perturbs it with normal noise truncated at zero.
#[derive(Debug, Clone)]
pub struct BootstrapSampler<'a> {
    dataset: &'a ThroughputDataset,
    period_length_weeks: f64,
    sigma: f64,
}

impl<'a> BootstrapSampler<'a> {
    pub fn new(
        dataset: &'a ThroughputDataset,
        period_length_weeks: f64,
        sigma: f64,
    ) -> Result<Self, ValidationError> {
        if !period_length_weeks.is_finite() || period_length_weeks <= 0.0 {
            return Err(ValidationError::InvalidPeriodLength(period_length_weeks));
        }
        validate_sigma(sigma)?;
        Ok(Self {
            dataset,
            period_length_weeks,
            sigma,
        })
    }
}

impl ThroughputSampler for BootstrapSampler<'_> {
    fn sample_increment<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        // The dataset is non-empty by construction.
        let drawn = self.dataset.values().choose(rng).copied().unwrap_or(0.0);
        let rate = drawn / self.period_length_weeks;
        sample_truncated_normal(rate, self.sigma, rng)
    }
}

/// Samples `N(mean, sigma)` conditioned on the outcome being non-negative.
///
/// Uses rejection sampling. Callers only pass `mean >= 0`, so each draw is
/// accepted with probability of at least one half.
pub fn sample_truncated_normal<R: Rng + ?Sized>(mean: f64, sigma: f64, rng: &mut R) -> f64 {
    if sigma == 0.0 {
        return mean.max(0.0);
    }
    let normal = match Normal::new(mean, sigma) {
        Ok(normal) => normal,
        Err(_) => return mean.max(0.0),
    };
    loop {
        let value = normal.sample(rng);
        if value >= 0.0 {
            return value;
        }
    }
}
