use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("throughput file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("failed to read throughput file {path}: {source}")]
    ReadFile { path: PathBuf, source: io::Error },
    #[error("failed to parse throughput csv {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("failed to parse throughput yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid throughput value '{value}' in row {row}")]
    InvalidToken { row: usize, value: String },
    #[error("throughput values must be finite and non-negative, got {0}")]
    InvalidValue(f64),
    #[error("no valid throughput values found")]
    EmptyDataset,
}

/// One dated throughput observation, as stored in throughput YAML files.
#[derive(Debug, Clone, PartialEq)]
pub struct Throughput {
    pub date: NaiveDate,
    pub completed_issues: f64,
}

/// Historical per-period throughput, validated once and then shared
/// read-only by every trial of a forecast.
///
/// The dataset is never empty and holds only finite, non-negative values.
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputDataset {
    values: Vec<f64>,
}

impl ThroughputDataset {
    pub fn new(values: Vec<f64>) -> Result<Self, InputError> {
        if values.is_empty() {
            return Err(InputError::EmptyDataset);
        }
        if let Some(value) = values
            .iter()
            .copied()
            .find(|value| !value.is_finite() || *value < 0.0)
        {
            return Err(InputError::InvalidValue(value));
        }
        Ok(Self { values })
    }

    pub fn from_records(records: &[Throughput]) -> Result<Self, InputError> {
        Self::new(records.iter().map(|t| t.completed_issues).collect())
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }
}
