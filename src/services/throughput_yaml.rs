use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::throughput::{InputError, Throughput};

#[derive(Deserialize)]
struct ThroughputRecord {
    date: NaiveDate,
    completed_issues: f64,
}

/// Parses a YAML list of `date` / `completed_issues` records.
pub fn deserialize_throughput_from_yaml_str(input: &str) -> Result<Vec<Throughput>, InputError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    let records: Vec<ThroughputRecord> = serde_yaml::from_str(input)?;
    Ok(records
        .into_iter()
        .map(|record| Throughput {
            date: record.date,
            completed_issues: record.completed_issues,
        })
        .collect())
}
