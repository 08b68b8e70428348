//! Command handlers - extracted from main.rs for testability
//!
//! Each handler module contains the execution logic for one command plus
//! pure rendering helpers that the tests exercise directly.

pub mod config;
pub mod distance;
pub mod profiles;
pub mod read;
pub mod sync;
pub mod timer;

pub use config::execute_config;
pub use distance::execute_distance;
pub use profiles::execute_profiles;
pub use read::execute_read;
pub use sync::{execute_sync, run_tracker, SyncRun};
pub use timer::execute_timer;

use crate::commands::ReaderArgs;
use crate::error::{CliError, CliResult};
use framesync::{
    CaptureProfile, DigitClassifier, DirectoryAssetStore, FramesyncConfig, TimestampReader,
};
use std::path::{Path, PathBuf};

/// Glyph directory used when neither the flag nor the config file names one
pub const DEFAULT_ASSET_DIR: &str = "times";

/// Profile named on the command line, by built-in name or YAML path.
pub fn resolve_profile(arg: Option<&str>, run_config: &FramesyncConfig) -> CliResult<CaptureProfile> {
    let Some(arg) = arg else {
        return Ok(run_config.profile.resolve()?);
    };
    if CaptureProfile::builtin(arg).is_some() {
        return Ok(CaptureProfile::resolve(arg)?);
    }
    let path = Path::new(arg);
    if path.is_file() {
        return Ok(CaptureProfile::from_file(path)?);
    }
    Err(CliError::invalid_argument(format!(
        "unknown profile {arg:?} (built-ins: {})",
        CaptureProfile::builtin_names().join(", ")
    )))
}

/// Glyph directory: the flag, then the config file, then `./times`.
pub fn resolve_assets(arg: Option<&Path>, run_config: &FramesyncConfig) -> CliResult<PathBuf> {
    let dir = arg
        .map(Path::to_path_buf)
        .or_else(|| run_config.assets.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSET_DIR));
    if !dir.is_dir() {
        return Err(CliError::invalid_argument(format!(
            "Glyph directory not found: {} (use --assets to specify)",
            dir.display()
        )));
    }
    Ok(dir)
}

/// Assemble a timestamp reader from flags layered over the config file.
pub fn build_reader(args: &ReaderArgs, run_config: &FramesyncConfig) -> CliResult<TimestampReader> {
    let profile = resolve_profile(args.profile.as_deref(), run_config)?;
    let assets = resolve_assets(args.assets.as_deref(), run_config)?;

    let mut classifier_config = run_config.classifier.clone();
    if let Some(min_confidence) = args.min_confidence {
        classifier_config = classifier_config.with_min_confidence(min_confidence);
    }

    tracing::debug!(
        profile = %profile.name,
        assets = %assets.display(),
        min_confidence = classifier_config.min_confidence,
        "building timestamp reader"
    );
    let classifier =
        DigitClassifier::from_store(&DirectoryAssetStore::new(assets), classifier_config)?;
    Ok(TimestampReader::new(profile, classifier)?)
}

/// Print to stdout, or write to `out_path` when given.
pub fn write_output(content: &str, out_path: Option<&Path>) -> CliResult<()> {
    out_path.map_or_else(
        || {
            print!("{content}");
            Ok(())
        },
        |path| {
            std::fs::write(path, content)
                .map_err(|e| CliError::report_generation(format!("Failed to write report: {e}")))
        },
    )
}
