//! Drift tracker output types.

use crate::timer::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A video frame confirmed on the canonical timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPoint {
    /// 0-based index of the frame in the video
    pub frame_index: u64,
    /// Frames the video lags the canonical timeline at this point
    pub drift: i64,
}

/// Phase of a tracking run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerState {
    /// Reading frames until the sentinel reading shows up
    SeekingStart,
    /// Comparing each frame against the canonical sequence
    Tracking,
    /// Finished, successfully or not
    Done,
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SeekingStart => write!(f, "seeking start"),
            Self::Tracking => write!(f, "tracking"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// A change, or a rejected change, in drift.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DriftEvent {
    /// The video showed the same game frame twice
    RepeatedFrame {
        /// Frame where the repeat was noticed
        frame_index: u64,
        /// Reading the canonical timeline called for
        expected: Timestamp,
        /// Reading actually seen
        observed: Timestamp,
        /// Drift after the event
        frames_behind: i64,
    },
    /// The video skipped game frames
    DroppedFrames {
        /// Frame where the skip was noticed
        frame_index: u64,
        /// Number of game frames skipped
        count: i64,
        /// Reading the canonical timeline called for
        expected: Timestamp,
        /// Reading actually seen
        observed: Timestamp,
        /// Drift after the event
        frames_behind: i64,
    },
    /// A jump too large (or backwards) to trust, treated as a misread
    IgnoredJump {
        /// Frame carrying the suspicious reading
        frame_index: u64,
        /// Signed change in drift the reading implied
        jump: i64,
        /// Reading the canonical timeline called for
        expected: Timestamp,
        /// Reading actually seen
        observed: Timestamp,
    },
}

impl DriftEvent {
    /// Frame index the event refers to
    #[must_use]
    pub const fn frame_index(&self) -> u64 {
        match self {
            Self::RepeatedFrame { frame_index, .. }
            | Self::DroppedFrames { frame_index, .. }
            | Self::IgnoredJump { frame_index, .. } => *frame_index,
        }
    }
}

impl fmt::Display for DriftEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RepeatedFrame {
                frame_index,
                frames_behind,
                ..
            } => write!(
                f,
                "Repeated frame {frame_index} ({frames_behind} frames behind)"
            ),
            Self::DroppedFrames {
                frame_index,
                count,
                frames_behind,
                ..
            } => write!(
                f,
                "Skipped {count} frame{} after frame {frame_index} ({frames_behind} frames behind)",
                if *count == 1 { "" } else { "s" }
            ),
            Self::IgnoredJump {
                frame_index,
                jump,
                expected,
                observed,
            } => write!(
                f,
                "Ignored jump of {jump} at frame {frame_index} (read {observed}, expected {expected})"
            ),
        }
    }
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The whole canonical sequence was walked
    Complete,
    /// Stopped early by the caller
    Stopped,
    /// The sentinel reading never appeared
    StartNotFound,
    /// Frames ran out mid-match
    StreamExhausted,
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => write!(f, "COMPLETE"),
            Self::Stopped => write!(f, "STOPPED"),
            Self::StartNotFound => write!(f, "START NOT FOUND"),
            Self::StreamExhausted => write!(f, "STREAM EXHAUSTED"),
        }
    }
}

/// Summary of one tracking run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// How the run ended
    pub outcome: SyncOutcome,
    /// Frame index where the sentinel reading was seen
    pub origin_frame: Option<u64>,
    /// Frames pulled from the feed
    pub frames_read: u64,
    /// Sync points emitted
    pub points_emitted: u64,
    /// Frames whose timer could not be read
    pub unreadable_frames: u64,
    /// Repeated-frame events
    pub repeated_frames: u64,
    /// Dropped-frame events
    pub drop_events: u64,
    /// Sum of dropped frame counts
    pub dropped_frames: i64,
    /// Jumps rejected as misreads
    pub ignored_jumps: u64,
    /// Drift at the end of the run
    pub final_drift: i64,
    /// Every event in order
    pub events: Vec<DriftEvent>,
}

impl SyncReport {
    /// Empty report for a run that has not started
    #[must_use]
    pub const fn new() -> Self {
        Self {
            outcome: SyncOutcome::Stopped,
            origin_frame: None,
            frames_read: 0,
            points_emitted: 0,
            unreadable_frames: 0,
            repeated_frames: 0,
            drop_events: 0,
            dropped_frames: 0,
            ignored_jumps: 0,
            final_drift: 0,
            events: Vec::new(),
        }
    }

    /// Fold an event into the counters
    pub fn record(&mut self, event: DriftEvent) {
        match &event {
            DriftEvent::RepeatedFrame { .. } => self.repeated_frames += 1,
            DriftEvent::DroppedFrames { count, .. } => {
                self.drop_events += 1;
                self.dropped_frames += count;
            }
            DriftEvent::IgnoredJump { .. } => self.ignored_jumps += 1,
        }
        self.events.push(event);
    }

    /// Whether the video tracked the timeline without repeats or drops
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.repeated_frames == 0 && self.drop_events == 0
    }
}

impl Default for SyncReport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Outcome: {}", self.outcome)?;
        match self.origin_frame {
            Some(origin) => writeln!(f, "Match start: frame {origin}")?,
            None => writeln!(f, "Match start: not found")?,
        }
        writeln!(f, "Frames read: {}", self.frames_read)?;
        writeln!(f, "Sync points: {}", self.points_emitted)?;
        writeln!(f, "Unreadable frames: {}", self.unreadable_frames)?;
        writeln!(
            f,
            "Repeated frames: {}  Drops: {} ({} frames)  Ignored jumps: {}",
            self.repeated_frames, self.drop_events, self.dropped_frames, self.ignored_jumps
        )?;
        write!(f, "Final drift: {} frames", self.final_drift)
    }
}
