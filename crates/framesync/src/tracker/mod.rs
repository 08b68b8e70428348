//! Drift tracking: keep video frames aligned with the canonical countdown.
//!
//! ```text
//!            sentinel seen                 sequence exhausted
//! SeekingStart ───────────► Tracking ─────────────────────────► Done
//!      │                       │  per frame: on track  → emit (frame, drift)
//!      │                       │             repeated  → drift -= 1
//!      │                       │             dropped   → drift += n  (n < max_jump)
//!      │                       │             other     → ignored
//!      └── frames run out ─────┴── frames run out ──► Err(StreamExhausted), Done
//! ```

mod config;
mod engine;
mod types;

pub use config::{SyncConfig, DEFAULT_MAX_JUMP, DEFAULT_SENTINEL};
pub use engine::{DriftTracker, IterFeed, Reading, ReaderFeed, TimerFeed};
pub use types::{DriftEvent, SyncOutcome, SyncPoint, SyncReport, TrackerState};
