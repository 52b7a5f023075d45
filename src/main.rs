mod commands;
mod domain;
mod logging;
mod services;
#[cfg(test)]
mod test_support;

use std::process::ExitCode;

use crate::commands::base_commands::{CliArgs, Commands};
use crate::commands::completions_cmd::completions_command;
use crate::commands::forecast_cmd::forecast_command;
use clap::Parser;

fn main() -> ExitCode {
    logging::init_tracing();

    let args = CliArgs::parse();
    match args.command {
        Commands::Forecast(forecast_args) => forecast_command(forecast_args),
        Commands::Completions { shell } => {
            completions_command(shell);
            ExitCode::SUCCESS
        }
    }
}
