use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Forecast completion dates for remaining work from throughput history
    Forecast(ForecastArgs),
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct ForecastArgs {
    /// Throughput history: CSV of per-period values or YAML throughput records
    #[arg(short = 'f', long)]
    pub throughput: String,
    /// Total number of items in scope
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    pub target_items: Option<i64>,
    /// Number of items already completed
    #[arg(short, long, allow_negative_numbers = true)]
    pub completed_items: Option<i64>,
    /// Length of one throughput observation in weeks
    #[arg(short = 'w', long, allow_negative_numbers = true)]
    pub period_length_weeks: Option<f64>,
    /// Standard deviation of the per-period throughput noise
    #[arg(long, allow_negative_numbers = true)]
    pub throughput_sigma: Option<f64>,
    /// Forecast start date (YYYY-MM-DD) [default: today]
    #[arg(short, long)]
    pub start_date: Option<String>,
    /// Number of simulated trials [default: 10000]
    #[arg(short = 'i', long)]
    pub simulations: Option<usize>,
    /// Percentiles to report, comma separated [default: 60,85,95]
    #[arg(short, long, value_delimiter = ',')]
    pub percentiles: Option<Vec<f64>>,
    /// Maximum simulated periods per trial before giving up [default: 10000]
    #[arg(long)]
    pub max_periods: Option<u32>,
    /// Seed for reproducible forecasts
    #[arg(long)]
    pub seed: Option<u64>,
    /// Abort the forecast after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    /// YAML file with forecast settings; command line flags take precedence
    #[arg(long)]
    pub config: Option<String>,
    /// Write the forecast report to this file
    #[arg(short, long)]
    pub output: Option<String>,
    /// Format of the report file
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,
    /// Include the per-trial elapsed days in the report file
    #[arg(long)]
    pub include_distribution: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}
