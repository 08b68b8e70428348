//! Timer Calendar: valid clock readings, frame distance, and the canonical countdown.
//!
//! # Usage
//!
//! ```text
//! "075999" ──→ Timestamp::from_str ──→ Timestamp
//!                                          │
//!                      Timestamp::distance_to(other) ──→ signed frames
//!
//! start_seconds ──→ canonical_sequence ──→ TimerValues (lazy, one tick per frame)
//! ```

pub mod calendar;
pub mod timestamp;

pub use calendar::{
    canonical_sequence, centis_index, distance, is_valid_timestamp, sequence_position, TimerValues,
    DEFAULT_START_SECONDS, FINAL_SECOND, MAX_START_SECONDS, VALID_CENTIS,
};
pub use timestamp::{Timestamp, FRAMES_PER_MINUTE, FRAMES_PER_SECOND};
