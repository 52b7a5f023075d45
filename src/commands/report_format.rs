use crate::services::forecast_types::{ForecastPercentile, ForecastReport};

pub fn format_forecast_report(report: &ForecastReport) -> String {
    let mut lines = Vec::new();
    lines.push("Forecast Report".to_string());
    lines.push(format!("Data source: {}", report.data_source));
    lines.push(format!("Start date: {}", report.start_date));
    lines.push(format!(
        "Remaining items: {} of {}",
        report.target_items - report.completed_items,
        report.target_items
    ));
    lines.push(format!("Simulations: {}", report.simulations));
    lines.push(format!("Seed: {}", report.seed));
    lines.push(String::new());
    lines.push("Percentiles:".to_string());
    lines.push("Percentile | Days | Date".to_string());
    lines.push("-----------|------|-----".to_string());
    for percentile in &report.percentiles {
        lines.push(format_percentile_row(percentile));
    }

    lines.join("\n")
}

fn format_percentile_row(percentile: &ForecastPercentile) -> String {
    format!(
        "{label} | {days:.2} | {date}",
        label = percentile.label,
        days = percentile.days,
        date = percentile.date.format("%Y-%m-%d")
    )
}
