pub mod forecast_config;
pub mod throughput;
