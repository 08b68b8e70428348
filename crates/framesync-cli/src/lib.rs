//! Framesync CLI Library
//!
//! Command-line front end for the framesync drift tracker.
//!
//! ## Usage
//!
//! ```bash
//! framesync sync match.avi -n 0 --assets times     # Track a whole match
//! framesync read frame.png --scores                 # Debug one frame
//! framesync timer --limit 5                         # First canonical readings
//! framesync distance 075999 075899                  # Frames between readings
//! ```

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod logging;
mod output;

pub use commands::{
    Cli, ColorArg, Commands, DistanceArgs, LogFormatArg, ProfilesArgs, ReadArgs, ReaderArgs,
    ReportFormat, SyncArgs, TimerArgs,
};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::{env_filter, init_logging};
pub use output::ProgressReporter;
