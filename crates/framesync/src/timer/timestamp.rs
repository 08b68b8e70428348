//! The six-digit `MMSSCC` match clock reading.

use super::calendar::{centis_index, VALID_CENTIS};
use crate::result::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Frames per clock second.
pub const FRAMES_PER_SECOND: i64 = 60;

/// Frames per clock minute.
pub const FRAMES_PER_MINUTE: i64 = 60 * FRAMES_PER_SECOND;

/// A validated on-screen timer reading.
///
/// Displays and parses as the six-character `MMSSCC` form. Ordering follows
/// the numeric value of the clock, so later moments in a match compare lower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp {
    minutes: u8,
    seconds: u8,
    centis: u8,
}

impl Timestamp {
    /// Build a timestamp from its three fields.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidTimestamp` if any field is out of range or
    /// the centisecond code is not one the clock renders.
    pub fn new(minutes: u8, seconds: u8, centis: u8) -> SyncResult<Self> {
        let shown = format!("{minutes:02}{seconds:02}{centis:02}");
        if minutes > 99 {
            return Err(SyncError::invalid_timestamp(shown, "minutes exceed 99"));
        }
        if seconds > 59 {
            return Err(SyncError::invalid_timestamp(shown, "seconds exceed 59"));
        }
        if centis_index(centis).is_none() {
            return Err(SyncError::invalid_timestamp(
                shown,
                "centisecond code is never displayed",
            ));
        }
        Ok(Self {
            minutes,
            seconds,
            centis,
        })
    }

    /// Construct without validation. Callers guarantee the invariants.
    pub(crate) const fn from_parts_unchecked(minutes: u8, seconds: u8, centis: u8) -> Self {
        Self {
            minutes,
            seconds,
            centis,
        }
    }

    /// Minutes field
    #[must_use]
    pub const fn minutes(&self) -> u8 {
        self.minutes
    }

    /// Seconds field
    #[must_use]
    pub const fn seconds(&self) -> u8 {
        self.seconds
    }

    /// Centisecond code
    #[must_use]
    pub const fn centis(&self) -> u8 {
        self.centis
    }

    /// Whole clock seconds remaining (`minutes * 60 + seconds`).
    #[must_use]
    pub const fn total_seconds(&self) -> u32 {
        self.minutes as u32 * 60 + self.seconds as u32
    }

    /// Position of this reading on the frame axis.
    ///
    /// Higher clock values sit at higher positions. Only differences between
    /// positions are meaningful.
    #[must_use]
    pub fn frame_position(&self) -> i64 {
        // Fields are validated on construction, so the code is always present.
        let index = centis_index(self.centis).unwrap_or(VALID_CENTIS.len() - 1);
        i64::from(self.minutes) * FRAMES_PER_MINUTE + i64::from(self.seconds) * FRAMES_PER_SECOND
            - index as i64
    }

    /// Signed frame distance from `self` to `to`.
    ///
    /// The centisecond index difference is subtracted because the code list
    /// runs in descending numeric order while ticks move forward in time.
    #[must_use]
    pub fn distance_to(&self, to: &Self) -> i64 {
        to.frame_position() - self.frame_position()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}{:02}", self.minutes, self.seconds, self.centis)
    }
}

impl FromStr for Timestamp {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 6 {
            return Err(SyncError::invalid_timestamp(s, "expected six digits"));
        }
        if !bytes.iter().all(u8::is_ascii_digit) {
            return Err(SyncError::invalid_timestamp(s, "expected only ASCII digits"));
        }
        let field = |i: usize| (bytes[i] - b'0') * 10 + (bytes[i + 1] - b'0');
        Self::new(field(0), field(2), field(4))
    }
}

impl TryFrom<String> for Timestamp {
    type Error = SyncError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timestamp> for String {
    fn from(value: Timestamp) -> Self {
        value.to_string()
    }
}
