//! Framesync CLI: measure frame drift in captured game video
//!
//! ## Usage
//!
//! ```bash
//! framesync sync match.avi --assets times   # Print `frame drift` pairs
//! framesync --config framesync.yaml config  # Show effective settings
//! ```

use clap::Parser;
use framesync_cli::{
    handlers, init_logging, Cli, CliConfig, CliResult, ColorChoice, Commands, LogFormat, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    init_logging(&config);

    match cli.command {
        Commands::Sync(args) => handlers::execute_sync(&config, &args),
        Commands::Read(args) => handlers::execute_read(&config, &args),
        Commands::Timer(args) => handlers::execute_timer(&config, &args),
        Commands::Distance(args) => handlers::execute_distance(&config, &args),
        Commands::Profiles(args) => handlers::execute_profiles(&config, &args),
        Commands::Config => handlers::execute_config(&config),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(ColorChoice::from(cli.color))
        .with_log_format(LogFormat::from(cli.log_format))
        .with_config_file(cli.config.clone())
}
