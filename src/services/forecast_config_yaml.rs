use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::forecast_config::ForecastParameters;

#[derive(Error, Debug)]
pub enum ForecastConfigYamlError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("failed to read config file {path}: {source}")]
    ReadFile { path: PathBuf, source: io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Forecast settings read from a YAML file. Every field is optional; values
/// given on the command line take precedence.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastConfigRecord {
    pub target_items: Option<i64>,
    pub completed_items: Option<i64>,
    pub period_length_weeks: Option<f64>,
    pub throughput_sigma: Option<f64>,
    pub start_date: Option<String>,
    pub simulations: Option<usize>,
    pub percentiles: Option<Vec<f64>>,
    pub max_periods: Option<u32>,
    pub seed: Option<u64>,
    pub timeout_ms: Option<u64>,
}

impl ForecastConfigRecord {
    /// Layers `overrides` on top of `self`: any field set in `overrides`
    /// replaces the value from the file.
    pub fn merged_with(self, overrides: ForecastConfigRecord) -> ForecastConfigRecord {
        ForecastConfigRecord {
            target_items: overrides.target_items.or(self.target_items),
            completed_items: overrides.completed_items.or(self.completed_items),
            period_length_weeks: overrides.period_length_weeks.or(self.period_length_weeks),
            throughput_sigma: overrides.throughput_sigma.or(self.throughput_sigma),
            start_date: overrides.start_date.or(self.start_date),
            simulations: overrides.simulations.or(self.simulations),
            percentiles: overrides.percentiles.or(self.percentiles),
            max_periods: overrides.max_periods.or(self.max_periods),
            seed: overrides.seed.or(self.seed),
            timeout_ms: overrides.timeout_ms.or(self.timeout_ms),
        }
    }

    /// Builds raw forecast parameters, falling back to built-in defaults for
    /// anything left unset. Returns `None` when no target was given.
    pub fn to_parameters(&self) -> Option<ForecastParameters> {
        let mut params =
            ForecastParameters::new(self.target_items?, self.completed_items.unwrap_or(0));
        if let Some(value) = self.period_length_weeks {
            params.period_length_weeks = value;
        }
        if let Some(value) = self.throughput_sigma {
            params.throughput_sigma = value;
        }
        if let Some(value) = self.simulations {
            params.simulation_count = value;
        }
        if let Some(value) = &self.percentiles {
            params.percentiles = value.clone();
        }
        if let Some(value) = self.max_periods {
            params.max_periods_per_trial = value;
        }
        params.start_date = self.start_date.clone();
        params.seed = self.seed;
        Some(params)
    }
}

pub fn load_forecast_config_from_yaml_file<P: AsRef<Path>>(
    path: P,
) -> Result<ForecastConfigRecord, ForecastConfigYamlError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ForecastConfigYamlError::FileNotFound(path.to_path_buf()));
    }
    let contents =
        std::fs::read_to_string(path).map_err(|source| ForecastConfigYamlError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
    deserialize_forecast_config_from_yaml_str(&contents, path)
}

fn deserialize_forecast_config_from_yaml_str(
    input: &str,
    origin_path: &Path,
) -> Result<ForecastConfigRecord, ForecastConfigYamlError> {
    if input.trim().is_empty() {
        return Ok(ForecastConfigRecord::default());
    }
    serde_yaml::from_str(input).map_err(|source| ForecastConfigYamlError::Parse {
        path: origin_path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<ForecastConfigRecord, ForecastConfigYamlError> {
        deserialize_forecast_config_from_yaml_str(input, Path::new("forecast.yaml"))
    }

    #[test]
    fn parses_all_fields() {
        let record = parse(
            "target_items: 120\ncompleted_items: 30\nperiod_length_weeks: 2\n\
             throughput_sigma: 4.5\nstart_date: 2026-03-02\nsimulations: 500\n\
             percentiles: [50, 90]\nmax_periods: 200\nseed: 7\ntimeout_ms: 1500\n",
        )
        .unwrap();

        assert_eq!(record.target_items, Some(120));
        assert_eq!(record.completed_items, Some(30));
        assert_eq!(record.period_length_weeks, Some(2.0));
        assert_eq!(record.throughput_sigma, Some(4.5));
        assert_eq!(record.start_date.as_deref(), Some("2026-03-02"));
        assert_eq!(record.simulations, Some(500));
        assert_eq!(record.percentiles, Some(vec![50.0, 90.0]));
        assert_eq!(record.max_periods, Some(200));
        assert_eq!(record.seed, Some(7));
        assert_eq!(record.timeout_ms, Some(1500));
    }

    #[test]
    fn empty_file_is_an_empty_record() {
        assert_eq!(parse("\n").unwrap(), ForecastConfigRecord::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            parse("target_itmes: 5\n"),
            Err(ForecastConfigYamlError::Parse { .. })
        ));
    }

    #[test]
    fn overrides_win_over_file_values() {
        let file = ForecastConfigRecord {
            target_items: Some(100),
            completed_items: Some(10),
            throughput_sigma: Some(3.0),
            ..Default::default()
        };
        let overrides = ForecastConfigRecord {
            target_items: Some(150),
            seed: Some(9),
            ..Default::default()
        };

        let merged = file.merged_with(overrides);
        assert_eq!(merged.target_items, Some(150));
        assert_eq!(merged.completed_items, Some(10));
        assert_eq!(merged.throughput_sigma, Some(3.0));
        assert_eq!(merged.seed, Some(9));
    }

    #[test]
    fn to_parameters_fills_defaults() {
        let record = ForecastConfigRecord {
            target_items: Some(40),
            ..Default::default()
        };
        let params = record.to_parameters().unwrap();
        assert_eq!(params, ForecastParameters::new(40, 0));
    }

    #[test]
    fn to_parameters_requires_target() {
        assert_eq!(ForecastConfigRecord::default().to_parameters(), None);
    }
}
