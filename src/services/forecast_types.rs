use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::domain::forecast_config::SimulationConfig;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ForecastPercentile {
    pub label: String,
    pub percentile: f64,
    pub days: f64,
    pub date: NaiveDate,
}

/// Outcome of one forecast: percentile dates plus the per-trial elapsed days
/// in trial order.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    base_date: NaiveDate,
    seed: u64,
    percentiles: Vec<ForecastPercentile>,
    elapsed_days: Vec<u32>,
}

impl ForecastResult {
    pub(crate) fn new(
        base_date: NaiveDate,
        seed: u64,
        percentiles: Vec<ForecastPercentile>,
        elapsed_days: Vec<u32>,
    ) -> Self {
        Self {
            base_date,
            seed,
            percentiles,
            elapsed_days,
        }
    }

    pub fn base_date(&self) -> NaiveDate {
        self.base_date
    }

    /// Seed the random streams were derived from; rerunning with it
    /// reproduces this result.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn percentiles(&self) -> &[ForecastPercentile] {
        &self.percentiles
    }

    pub fn date_for(&self, label: &str) -> Option<NaiveDate> {
        self.percentiles
            .iter()
            .find(|p| p.label == label)
            .map(|p| p.date)
    }

    pub fn elapsed_days(&self) -> &[u32] {
        &self.elapsed_days
    }

    pub fn simulation_count(&self) -> usize {
        self.elapsed_days.len()
    }
}

/// Percentile label to date mapping, serialized as a map in percentile order.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileDates(pub Vec<(String, NaiveDate)>);

impl Serialize for PercentileDates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, date) in &self.0 {
            map.serialize_entry(label, &date.format("%Y-%m-%d").to_string())?;
        }
        map.end()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ForecastReport {
    pub data_source: String,
    pub start_date: String,
    pub seed: u64,
    pub simulations: usize,
    pub target_items: u64,
    pub completed_items: u64,
    pub period_length_weeks: f64,
    pub throughput_sigma: f64,
    pub forecast: PercentileDates,
    pub percentiles: Vec<ForecastPercentile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_days: Option<Vec<u32>>,
}

impl ForecastReport {
    pub fn new(
        data_source: String,
        config: &SimulationConfig,
        result: &ForecastResult,
        include_distribution: bool,
    ) -> Self {
        Self {
            data_source,
            start_date: result.base_date().format("%Y-%m-%d").to_string(),
            seed: result.seed(),
            simulations: result.simulation_count(),
            target_items: config.target_items(),
            completed_items: config.completed_items(),
            period_length_weeks: config.period_length_weeks(),
            throughput_sigma: config.throughput_sigma(),
            forecast: PercentileDates(
                result
                    .percentiles()
                    .iter()
                    .map(|p| (p.label.clone(), p.date))
                    .collect(),
            ),
            percentiles: result.percentiles().to_vec(),
            elapsed_days: include_distribution.then(|| result.elapsed_days().to_vec()),
        }
    }
}
