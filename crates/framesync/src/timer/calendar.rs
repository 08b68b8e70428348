//! Valid clock readings and the canonical countdown.
//!
//! The match clock does not render every centisecond. Each second it steps
//! through the same 60 two-digit codes, one per frame at 60 fps, so a
//! centisecond code doubles as a frame index within its second.

use super::timestamp::Timestamp;
use crate::result::{SyncError, SyncResult};
use std::iter::FusedIterator;

/// Centisecond codes the clock renders, in tick order (descending).
pub const VALID_CENTIS: [u8; 60] = [
    99, 98, 96, 94, 93, 91, //
    89, 88, 86, 84, 83, 81, //
    79, 78, 76, 74, 73, 71, //
    69, 68, 66, 64, 63, 61, //
    59, 58, 56, 54, 53, 51, //
    49, 47, 46, 44, 42, 41, //
    39, 37, 36, 34, 32, 31, //
    29, 27, 26, 24, 22, 21, //
    19, 17, 16, 14, 12, 11, //
    9, 7, 6, 4, 2, 0,
];

/// Default match length in seconds (8:00).
pub const DEFAULT_START_SECONDS: u32 = 480;

/// The last second the countdown is read through. Its `00` frame is never shown.
pub const FINAL_SECOND: u32 = 5;

/// Largest start the six-digit display can hold (99:59).
pub const MAX_START_SECONDS: u32 = 99 * 60 + 59;

/// Position of a centisecond code in tick order, `None` if never displayed.
#[must_use]
pub fn centis_index(centis: u8) -> Option<usize> {
    VALID_CENTIS.iter().position(|&c| c == centis)
}

/// Whether `s` is a reading the match clock can show.
///
/// Requires exactly six ASCII digits, seconds below 60, and a centisecond
/// code from [`VALID_CENTIS`].
#[must_use]
pub fn is_valid_timestamp(s: &str) -> bool {
    s.parse::<Timestamp>().is_ok()
}

/// Signed frame distance between two readings given as strings.
///
/// Returns `None` when either side is not a valid timestamp.
#[must_use]
pub fn distance(from: &str, to: &str) -> Option<i64> {
    let from: Timestamp = from.parse().ok()?;
    let to: Timestamp = to.parse().ok()?;
    Some(from.distance_to(&to))
}

/// Canonical countdown for a match of `start_seconds`.
///
/// # Errors
///
/// Returns `SyncError::Configuration` if the start is not representable or
/// does not leave at least one displayed second above [`FINAL_SECOND`].
pub fn canonical_sequence(start_seconds: u32) -> SyncResult<TimerValues> {
    TimerValues::new(start_seconds)
}

/// Index of `reading` within `canonical_sequence(start_seconds)`, if present.
#[must_use]
pub fn sequence_position(start_seconds: u32, reading: &Timestamp) -> Option<usize> {
    let seconds = reading.total_seconds();
    if seconds == start_seconds {
        return (reading.centis() == 0).then_some(0);
    }
    if seconds < FINAL_SECOND || seconds >= start_seconds {
        return None;
    }
    let index = centis_index(reading.centis())?;
    if seconds == FINAL_SECOND && index == VALID_CENTIS.len() - 1 {
        return None;
    }
    Some(1 + (start_seconds - 1 - seconds) as usize * VALID_CENTIS.len() + index)
}

/// Lazy generator of the readings a correctly running clock displays.
///
/// Yields `start:00` first, then every valid code of every second from
/// `start - 1` down to [`FINAL_SECOND`], stopping before that second's `00`.
#[derive(Debug, Clone)]
pub struct TimerValues {
    start: Option<Timestamp>,
    second: u32,
    index: usize,
    done: bool,
}

impl TimerValues {
    /// Create a generator for a match of `start_seconds`.
    ///
    /// # Errors
    ///
    /// See [`canonical_sequence`].
    pub fn new(start_seconds: u32) -> SyncResult<Self> {
        if start_seconds <= FINAL_SECOND || start_seconds > MAX_START_SECONDS {
            return Err(SyncError::configuration(format!(
                "match start of {start_seconds}s must be between {} and {MAX_START_SECONDS}",
                FINAL_SECOND + 1
            )));
        }
        Ok(Self {
            start: Some(clock_reading(start_seconds, 0)),
            second: start_seconds - 1,
            index: 0,
            done: false,
        })
    }

    fn remaining(&self) -> usize {
        let head = usize::from(self.start.is_some());
        if self.done {
            return head;
        }
        head + (self.second - FINAL_SECOND) as usize * VALID_CENTIS.len()
            + (VALID_CENTIS.len() - 1)
            - self.index
    }
}

impl Iterator for TimerValues {
    type Item = Timestamp;

    fn next(&mut self) -> Option<Timestamp> {
        if let Some(start) = self.start.take() {
            return Some(start);
        }
        if self.done {
            return None;
        }

        let centis = VALID_CENTIS[self.index];
        // 00:05.00 is not shown.
        if self.second == FINAL_SECOND && centis == 0 {
            self.done = true;
            return None;
        }

        let reading = clock_reading(self.second, centis);
        self.index += 1;
        if self.index == VALID_CENTIS.len() {
            self.index = 0;
            self.second -= 1;
        }
        Some(reading)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for TimerValues {}

impl FusedIterator for TimerValues {}

fn clock_reading(total_seconds: u32, centis: u8) -> Timestamp {
    Timestamp::from_parts_unchecked((total_seconds / 60) as u8, (total_seconds % 60) as u8, centis)
}
