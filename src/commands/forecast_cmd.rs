use std::process::ExitCode;
use std::time::Duration;

use tracing::debug;

use crate::commands::base_commands::{ForecastArgs, OutputFormat};
use crate::commands::report_format::format_forecast_report;
use crate::domain::forecast_config::{ForecastParameters, ValidationError};
use crate::services::cancellation::Cancellation;
use crate::services::forecast::{ForecastError, forecast_from_dataset};
use crate::services::forecast_config_yaml::{
    ForecastConfigRecord, load_forecast_config_from_yaml_file,
};
use crate::services::forecast_types::ForecastReport;
use crate::services::throughput_source::load_throughput_dataset;

pub fn forecast_command(args: ForecastArgs) -> ExitCode {
    // Input problems win over configuration problems.
    let dataset = match load_throughput_dataset(&args.throughput) {
        Ok(dataset) => dataset,
        Err(e) => return report_failure(&ForecastError::from(e)),
    };
    let (parameters, cancellation) = match build_parameters(&args) {
        Ok(value) => value,
        Err(e) => return report_failure(&e),
    };

    let (config, result) = match forecast_from_dataset(&dataset, &parameters, &cancellation) {
        Ok(value) => value,
        Err(e) => return report_failure(&e),
    };

    let report = ForecastReport::new(
        data_source_name(&args.throughput),
        &config,
        &result,
        args.include_distribution,
    );
    println!("{}", format_forecast_report(&report));

    let Some(output) = &args.output else {
        return ExitCode::SUCCESS;
    };
    let contents = match serialize_report(&report, args.format) {
        Ok(contents) => contents,
        Err(e) => {
            debug!(error = %e, "report serialization failed");
            eprintln!("Failed to serialize forecast report: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = std::fs::write(output, contents) {
        debug!(error = ?e, output = %output, "report write failed");
        eprintln!("Failed to write forecast report: {e}");
        return ExitCode::FAILURE;
    }
    println!("Forecast report written to {output}");
    ExitCode::SUCCESS
}

/// Merges the optional config file with the command line flags, flags
/// taking precedence.
fn build_parameters(
    args: &ForecastArgs,
) -> Result<(ForecastParameters, Cancellation), ForecastError> {
    let from_file = match &args.config {
        Some(path) => load_forecast_config_from_yaml_file(path)?,
        None => ForecastConfigRecord::default(),
    };
    let settings = from_file.merged_with(record_from_args(args));

    let parameters = settings
        .to_parameters()
        .ok_or(ValidationError::MissingTarget)?;
    let cancellation = settings
        .timeout_ms
        .map(|ms| Cancellation::with_timeout(Duration::from_millis(ms)))
        .unwrap_or_default();
    Ok((parameters, cancellation))
}

fn record_from_args(args: &ForecastArgs) -> ForecastConfigRecord {
    ForecastConfigRecord {
        target_items: args.target_items,
        completed_items: args.completed_items,
        period_length_weeks: args.period_length_weeks,
        throughput_sigma: args.throughput_sigma,
        start_date: args.start_date.clone(),
        simulations: args.simulations,
        percentiles: args.percentiles.clone(),
        max_periods: args.max_periods,
        seed: args.seed,
        timeout_ms: args.timeout_ms,
    }
}

fn serialize_report(report: &ForecastReport, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(report).map_err(|e| e.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(report).map_err(|e| e.to_string()),
    }
}

fn report_failure(e: &ForecastError) -> ExitCode {
    debug!(error = ?e, "forecast failed");
    eprintln!("Failed to forecast: {e}");
    ExitCode::FAILURE
}

fn data_source_name(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
        .to_string()
}
