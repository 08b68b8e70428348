//! Framesync: align captured game video with its frame-exact event log.
//!
//! Captured video drops and repeats frames. The only signal available to
//! realign it is the match clock drawn on screen, so framesync reads that
//! clock from every frame, compares it against the countdown a perfectly
//! captured video would show, and reports how far the video has drifted.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   GrayImage   ┌─────────────────┐  Option<Timestamp>  ┌──────────────┐
//! │ FrameSource  │──────────────►│ TimestampReader │────────────────────►│ DriftTracker │──► SyncPoint*
//! │ (ffmpeg)     │               │  6 x Classifier │                     │              │
//! └──────────────┘               └────────┬────────┘                     └──────┬───────┘
//!                                         │                                     │
//!                                  GlyphTable (Arc)                      canonical_sequence
//!                                         │
//!                                    AssetStore
//! ```
//!
//! # Example
//!
//! ```no_run
//! use framesync::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> SyncResult<()> {
//! let classifier = DigitClassifier::from_store(
//!     &DirectoryAssetStore::new("times"),
//!     ClassifierConfig::default(),
//! )?;
//! let reader = TimestampReader::new(CaptureProfile::dolphin_643x528(), classifier)?;
//! let source = FfmpegFrameSource::open(Path::new("match.avi"))?;
//! let tracker = DriftTracker::new(ReaderFeed::new(source, reader), SyncConfig::default())?;
//! for point in tracker.take(600) {
//!     let point = point?;
//!     println!("{} {}", point.frame_index, point.drift);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod digits;
pub mod matching;
pub mod profile;
pub mod reader;
mod result;
pub mod source;
pub mod timer;
pub mod tracker;

#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) mod test_utils;

pub use config::{FramesyncConfig, ProfileSelection};
pub use digits::{
    AssetStore, ClassifierConfig, DigitClassifier, DigitScore, DigitSize, DirectoryAssetStore,
    GlyphColor, GlyphKey, GlyphScale, GlyphTable, MemoryAssetStore,
};
pub use matching::{MatchCandidate, NccMatcher, Rect, TemplateMatcher};
pub use profile::{CaptureProfile, DigitRegion};
pub use reader::{load_frame, threshold_to_zero, TimestampReader};
pub use result::{SyncError, SyncResult};
pub use source::{FfmpegFrameSource, FrameSource, MemoryFrameSource};
pub use timer::{canonical_sequence, distance, is_valid_timestamp, Timestamp, TimerValues};
pub use tracker::{
    DriftEvent, DriftTracker, IterFeed, ReaderFeed, Reading, SyncConfig, SyncOutcome, SyncPoint,
    SyncReport, TimerFeed, TrackerState,
};

/// Everything needed to run a synchronization
pub mod prelude {
    pub use super::config::*;
    pub use super::digits::*;
    pub use super::matching::*;
    pub use super::profile::*;
    pub use super::reader::*;
    pub use super::result::*;
    pub use super::source::*;
    pub use super::timer::*;
    pub use super::tracker::*;
}
