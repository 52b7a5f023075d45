pub mod cancellation;
pub mod forecast;
pub mod forecast_config_yaml;
pub mod forecast_types;
pub mod percentiles;
pub mod period_sampler;
pub mod throughput_source;
pub mod throughput_yaml;
pub mod trial_simulation;
