//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Framesync: measure frame drift in captured game video from the on-screen match clock
#[derive(Parser, Debug)]
#[command(name = "framesync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// YAML file with tracker, classifier, profile and asset settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Track drift through a video and print sync points
    Sync(SyncArgs),

    /// Read the match clock from a single still frame
    Read(ReadArgs),

    /// Print the canonical countdown
    Timer(TimerArgs),

    /// Frame distance between two clock readings
    Distance(DistanceArgs),

    /// List built-in capture profiles
    Profiles(ProfilesArgs),

    /// Print the effective configuration as YAML
    Config,
}

/// Arguments shared by commands that read the clock from frames
#[derive(Parser, Debug, Clone, Default)]
pub struct ReaderArgs {
    /// Directory holding the `{digit}_time_{black|white}.png` glyphs
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Built-in profile name, or path to a profile YAML file
    #[arg(long)]
    pub profile: Option<String>,

    /// Minimum match score for a digit to count as recognized
    #[arg(long)]
    pub min_confidence: Option<f32>,
}

/// Arguments for the sync command
#[derive(Parser, Debug)]
pub struct SyncArgs {
    /// Video file to analyze
    pub video: PathBuf,

    /// Stop after this many sync points (0 = run to the end of the match)
    #[arg(short = 'n', long, default_value = "600")]
    pub frames: u64,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ReportFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Match length in seconds the countdown starts from
    #[arg(long)]
    pub start_seconds: Option<u32>,

    /// Reading that marks the first frame of the match
    #[arg(long)]
    pub sentinel: Option<String>,

    /// Jumps of this many frames or more are treated as misreads
    #[arg(long)]
    pub max_jump: Option<i64>,

    /// Clock reader settings
    #[command(flatten)]
    pub reader: ReaderArgs,
}

/// Arguments for the read command
#[derive(Parser, Debug)]
pub struct ReadArgs {
    /// Image file holding one captured frame
    pub image: PathBuf,

    /// Also print the best digit and score for every region (implied by -v)
    #[arg(long)]
    pub scores: bool,

    /// Clock reader settings
    #[command(flatten)]
    pub reader: ReaderArgs,
}

/// Arguments for the timer command
#[derive(Parser, Debug)]
pub struct TimerArgs {
    /// Match length in seconds
    #[arg(long, default_value = "480")]
    pub start_seconds: u32,

    /// Skip this many readings first
    #[arg(long, default_value = "0")]
    pub skip: usize,

    /// Print at most this many readings
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Arguments for the distance command
#[derive(Parser, Debug)]
pub struct DistanceArgs {
    /// Reading to measure from, e.g. 075999
    pub from: String,

    /// Reading to measure to, e.g. 075998
    pub to: String,
}

/// Arguments for the profiles command
#[derive(Parser, Debug)]
pub struct ProfilesArgs {
    /// Print each profile's full definition as YAML
    #[arg(long)]
    pub yaml: bool,
}

/// Sync report format
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// One `frame drift` line per point, then a summary
    #[default]
    Text,
    /// Points and summary as a JSON document
    Json,
}

/// Color argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// JSON lines
    Json,
}

impl From<LogFormatArg> for crate::config::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}
