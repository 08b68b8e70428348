//! Sync command handler: track drift through a video.

use super::{build_reader, write_output};
use crate::commands::{ReportFormat, SyncArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use framesync::{
    DriftTracker, FfmpegFrameSource, ReaderFeed, SyncConfig, SyncPoint, SyncReport, TimerFeed,
    Timestamp,
};
use serde::Serialize;
use std::fmt::Write as _;

/// Points and summary of one run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncRun {
    /// Sync points in frame order
    pub points: Vec<SyncPoint>,
    /// Run summary
    pub report: SyncReport,
    /// Why the run stopped early, if it failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Execute the sync command
pub fn execute_sync(config: &CliConfig, args: &SyncArgs) -> CliResult<()> {
    if !args.video.exists() {
        return Err(CliError::invalid_argument(format!(
            "Video file not found: {}",
            args.video.display()
        )));
    }

    let run_config = config.load_run_config()?;
    let sync_config = apply_overrides(run_config.sync, args)?;
    let reader = build_reader(&args.reader, &run_config)?;

    let source = FfmpegFrameSource::open(&args.video)?;
    let profile = reader.profile();
    if (source.width(), source.height()) != (profile.width, profile.height) {
        return Err(CliError::config(format!(
            "video is {}x{} but profile '{}' expects {}x{}",
            source.width(),
            source.height(),
            profile.name,
            profile.width,
            profile.height
        )));
    }
    tracing::info!(
        video = %args.video.display(),
        width = source.width(),
        height = source.height(),
        "opened video"
    );

    let tracker = DriftTracker::new(ReaderFeed::new(source, reader), sync_config)?;
    let limit = (args.frames > 0).then_some(args.frames);

    let mut progress = ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    progress.start_progress(limit, "syncing");
    let run = run_tracker(tracker, limit, &progress);
    progress.finish();

    let content = match args.format {
        ReportFormat::Text => render_text(&run),
        ReportFormat::Json => render_json(&run)?,
    };
    write_output(&content, args.output.as_deref())?;
    progress.summary(&run.report);

    match run.error {
        Some(message) => Err(CliError::sync_failed(message)),
        None => Ok(()),
    }
}

/// Layer command-line tracker settings over the file settings.
pub fn apply_overrides(base: SyncConfig, args: &SyncArgs) -> CliResult<SyncConfig> {
    let mut sync = base;
    if let Some(start_seconds) = args.start_seconds {
        sync = sync.with_start_seconds(start_seconds);
    }
    if let Some(sentinel) = &args.sentinel {
        let sentinel: Timestamp = sentinel
            .parse()
            .map_err(|e| CliError::invalid_argument(format!("--sentinel: {e}")))?;
        sync = sync.with_sentinel(sentinel);
    }
    if let Some(max_jump) = args.max_jump {
        sync = sync.with_max_jump(max_jump);
    }
    sync.validate()?;
    Ok(sync)
}

/// Pull points until the tracker ends, fails, or `limit` points are out.
pub fn run_tracker<F: TimerFeed>(
    mut tracker: DriftTracker<F>,
    limit: Option<u64>,
    progress: &ProgressReporter,
) -> SyncRun {
    let mut points = Vec::new();
    let mut error = None;
    for item in tracker.by_ref() {
        match item {
            Ok(point) => {
                points.push(point);
                progress.increment(1);
                if point.drift != 0 {
                    progress.set_message(&format!("drift {}", point.drift));
                }
                if limit.is_some_and(|n| points.len() as u64 >= n) {
                    break;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "sync stopped");
                error = Some(e.to_string());
                break;
            }
        }
    }
    SyncRun {
        points,
        report: tracker.report(),
        error,
    }
}

/// `frame drift` per line, then the summary as `#` comments.
#[must_use]
pub fn render_text(run: &SyncRun) -> String {
    let mut out = String::new();
    for point in &run.points {
        let _ = writeln!(out, "{} {}", point.frame_index, point.drift);
    }
    for event in &run.report.events {
        let _ = writeln!(out, "# {event}");
    }
    for line in run.report.to_string().lines() {
        let _ = writeln!(out, "# {line}");
    }
    if let Some(error) = &run.error {
        let _ = writeln!(out, "# Error: {error}");
    }
    out
}

/// Pretty JSON document
pub fn render_json(run: &SyncRun) -> CliResult<String> {
    let mut json = serde_json::to_string_pretty(run)
        .map_err(|e| CliError::report_generation(format!("JSON serialization error: {e}")))?;
    json.push('\n');
    Ok(json)
}
