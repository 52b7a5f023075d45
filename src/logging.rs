use tracing_subscriber::EnvFilter;

/// Initializes stderr logging, filtered by the `FORECASTS_LOG` environment
/// variable. Defaults to `warn` so reports on stdout stay clean.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("FORECASTS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
