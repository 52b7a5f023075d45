use rand::Rng;
use thiserror::Error;

use crate::services::period_sampler::ThroughputSampler;

pub const DAYS_PER_PERIOD: u32 = 7;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error(
        "trial {trial} did not reach the target within {max_periods} periods \
         ({completed:.2} of {target} items completed)"
    )]
    NonConvergence {
        trial: usize,
        max_periods: u32,
        completed: f64,
        target: u64,
    },
    #[error("projected completion is beyond the supported calendar range ({0} days)")]
    DateOutOfRange(f64),
}

/// Where a walk starts, where it stops and how long it may take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialBounds {
    pub completed_items: u64,
    pub target_items: u64,
    pub max_periods: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialOutcome {
    pub elapsed_periods: u32,
}

impl TrialOutcome {
    pub fn elapsed_days(&self) -> u32 {
        self.elapsed_periods.saturating_mul(DAYS_PER_PERIOD)
    }
}

/// Runs one random walk from `completed_items` until the target is reached.
///
/// Returns [`SimulationError::NonConvergence`] once `max_periods` periods have
/// been simulated without reaching the target.
pub fn simulate_trial<S, R>(
    trial: usize,
    bounds: &TrialBounds,
    sampler: &S,
    rng: &mut R,
) -> Result<TrialOutcome, SimulationError>
where
    S: ThroughputSampler,
    R: Rng + ?Sized,
{
    let target = bounds.target_items as f64;
    let mut completed = bounds.completed_items as f64;
    let mut elapsed_periods = 0_u32;

    while completed < target {
        if elapsed_periods >= bounds.max_periods {
            return Err(SimulationError::NonConvergence {
                trial,
                max_periods: bounds.max_periods,
                completed,
                target: bounds.target_items,
            });
        }
        completed += sampler.sample_increment(rng);
        elapsed_periods += 1;
    }

    Ok(TrialOutcome { elapsed_periods })
}
