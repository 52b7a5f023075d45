use std::cell::Cell;

use chrono::NaiveDate;
use rand::Rng;

use crate::domain::forecast_config::ForecastParameters;
use crate::services::period_sampler::ThroughputSampler;

// A sampler that always completes the same amount of work per period
pub struct FixedSampler(pub f64);

impl ThroughputSampler for FixedSampler {
    fn sample_increment<R: Rng + ?Sized>(&self, _rng: &mut R) -> f64 {
        self.0
    }
}

// Replays a scripted sequence of increments, then repeats the last one
pub struct SequenceSampler {
    increments: Vec<f64>,
    next: Cell<usize>,
}

impl SequenceSampler {
    pub fn new(increments: Vec<f64>) -> Self {
        Self {
            increments,
            next: Cell::new(0),
        }
    }
}

impl ThroughputSampler for SequenceSampler {
    fn sample_increment<R: Rng + ?Sized>(&self, _rng: &mut R) -> f64 {
        let index = self.next.get().min(self.increments.len() - 1);
        self.next.set(index + 1);
        self.increments[index]
    }
}

pub fn on_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn parameters_on(target_items: i64, completed_items: i64, start_date: &str) -> ForecastParameters {
    let mut params = ForecastParameters::new(target_items, completed_items);
    params.start_date = Some(start_date.to_string());
    params
}
