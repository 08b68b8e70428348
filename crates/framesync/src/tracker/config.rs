//! Drift tracker configuration.

use crate::result::{SyncError, SyncResult};
use crate::timer::{
    sequence_position, Timestamp, DEFAULT_START_SECONDS, FINAL_SECOND, MAX_START_SECONDS,
};
use serde::{Deserialize, Serialize};

/// Default largest drift change accepted as real (exclusive).
pub const DEFAULT_MAX_JUMP: i64 = 30;

/// Default sentinel: the first reading of a running 8:00 clock.
pub const DEFAULT_SENTINEL: Timestamp = Timestamp::from_parts_unchecked(7, 59, 99);

/// Configuration for a tracking run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Match length in seconds (default: 480)
    pub start_seconds: u32,
    /// Reading that marks the synchronization origin (default: 075999)
    pub sentinel: Timestamp,
    /// Drops of this many frames or more are treated as misreads (default: 30)
    pub max_jump: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            start_seconds: DEFAULT_START_SECONDS,
            sentinel: DEFAULT_SENTINEL,
            max_jump: DEFAULT_MAX_JUMP,
        }
    }
}

impl SyncConfig {
    /// Set match length
    #[must_use]
    pub const fn with_start_seconds(mut self, start_seconds: u32) -> Self {
        self.start_seconds = start_seconds;
        self
    }

    /// Set sentinel reading
    #[must_use]
    pub const fn with_sentinel(mut self, sentinel: Timestamp) -> Self {
        self.sentinel = sentinel;
        self
    }

    /// Set maximum trusted jump
    #[must_use]
    pub const fn with_max_jump(mut self, max_jump: i64) -> Self {
        self.max_jump = max_jump;
        self
    }

    /// Position of the sentinel in the canonical sequence.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Configuration` if the sentinel is never displayed
    /// during a match of the configured length.
    pub fn sentinel_position(&self) -> SyncResult<usize> {
        sequence_position(self.start_seconds, &self.sentinel).ok_or_else(|| {
            SyncError::configuration(format!(
                "sentinel {} is not shown during a {}s match",
                self.sentinel, self.start_seconds
            ))
        })
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Configuration` for an unusable start, sentinel or
    /// jump limit.
    pub fn validate(&self) -> SyncResult<()> {
        if self.start_seconds <= FINAL_SECOND || self.start_seconds > MAX_START_SECONDS {
            return Err(SyncError::configuration(format!(
                "start_seconds {} must be between {} and {MAX_START_SECONDS}",
                self.start_seconds,
                FINAL_SECOND + 1
            )));
        }
        if self.max_jump < 1 {
            return Err(SyncError::configuration(format!(
                "max_jump must be at least 1, got {}",
                self.max_jump
            )));
        }
        self.sentinel_position().map(|_| ())
    }
}
