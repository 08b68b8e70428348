//! The synchronization state machine.

use super::config::SyncConfig;
use super::types::{DriftEvent, SyncOutcome, SyncPoint, SyncReport, TrackerState};
use crate::reader::TimestampReader;
use crate::result::{SyncError, SyncResult};
use crate::source::FrameSource;
use crate::timer::{canonical_sequence, Timestamp, TimerValues};
use std::iter::FusedIterator;

/// What the timer showed on one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    /// A valid clock reading
    Timer(Timestamp),
    /// The timer could not be read
    Unreadable,
}

impl From<Option<Timestamp>> for Reading {
    fn from(value: Option<Timestamp>) -> Self {
        value.map_or(Self::Unreadable, Self::Timer)
    }
}

/// One reading per video frame, in order.
pub trait TimerFeed {
    /// Reading of the next frame, `Ok(None)` at end of stream.
    fn next_reading(&mut self) -> SyncResult<Option<Reading>>;
}

/// Reads the timer off frames pulled from a [`FrameSource`].
#[derive(Debug)]
pub struct ReaderFeed<S> {
    source: S,
    reader: TimestampReader,
}

impl<S: FrameSource> ReaderFeed<S> {
    /// Pair a frame source with a reader
    #[must_use]
    pub const fn new(source: S, reader: TimestampReader) -> Self {
        Self { source, reader }
    }

    /// Underlying frame source
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }
}

impl<S: FrameSource> TimerFeed for ReaderFeed<S> {
    fn next_reading(&mut self) -> SyncResult<Option<Reading>> {
        let Some(frame) = self.source.next_frame()? else {
            return Ok(None);
        };
        Ok(Some(self.reader.read_checked(&frame)?.into()))
    }
}

/// Replays readings from an iterator, e.g. a previously recorded run.
#[derive(Debug, Clone)]
pub struct IterFeed<I> {
    readings: I,
}

impl<I: Iterator<Item = Option<Timestamp>>> IterFeed<I> {
    /// Wrap any sequence of optional readings
    pub fn new(readings: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            readings: readings.into_iter(),
        }
    }
}

impl<I: Iterator<Item = Option<Timestamp>>> TimerFeed for IterFeed<I> {
    fn next_reading(&mut self) -> SyncResult<Option<Reading>> {
        Ok(self.readings.next().map(Reading::from))
    }
}

/// Walks a video in lock-step with the canonical countdown.
///
/// Yields `Ok(SyncPoint)` for every frame confirmed on the timeline. A fatal
/// problem (feed error, frames running out) is yielded once as `Err`, after
/// which the iterator is finished. Non-fatal feed errors count the frame as
/// unreadable and tracking goes on.
#[derive(Debug)]
pub struct DriftTracker<F> {
    feed: F,
    config: SyncConfig,
    sequence: TimerValues,
    state: TrackerState,
    frames_behind: i64,
    frames_read: u64,
    report: SyncReport,
}

impl<F: TimerFeed> DriftTracker<F> {
    /// Create a tracker over `feed`.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Configuration` if the config is invalid, including
    /// a sentinel the canonical sequence never shows.
    pub fn new(feed: F, config: SyncConfig) -> SyncResult<Self> {
        config.validate()?;
        Ok(Self {
            feed,
            sequence: canonical_sequence(config.start_seconds)?,
            config,
            state: TrackerState::SeekingStart,
            frames_behind: 0,
            frames_read: 0,
            report: SyncReport::new(),
        })
    }

    /// Current phase
    #[must_use]
    pub const fn state(&self) -> TrackerState {
        self.state
    }

    /// Current drift in frames
    #[must_use]
    pub const fn frames_behind(&self) -> i64 {
        self.frames_behind
    }

    /// Frame index of the sentinel reading, once found
    #[must_use]
    pub const fn origin(&self) -> Option<u64> {
        self.report.origin_frame
    }

    /// Canonical readings not yet compared
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.sequence.len()
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Events recorded so far
    #[must_use]
    pub fn events(&self) -> &[DriftEvent] {
        &self.report.events
    }

    /// Snapshot of the run so far
    #[must_use]
    pub fn report(&self) -> SyncReport {
        let mut report = self.report.clone();
        report.frames_read = self.frames_read;
        report.final_drift = self.frames_behind;
        report
    }

    /// Drive the run to its end, discarding points.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error; the report is lost in that case, use
    /// the iterator directly to keep it.
    pub fn finish(mut self) -> SyncResult<SyncReport> {
        for item in self.by_ref() {
            item?;
        }
        Ok(self.report())
    }

    fn pull(&mut self) -> SyncResult<Option<(u64, Reading)>> {
        let reading = match self.feed.next_reading() {
            Ok(Some(reading)) => reading,
            Ok(None) => return Ok(None),
            Err(e) if !e.is_fatal() => {
                tracing::debug!(
                    frame = self.frames_read,
                    error = %e,
                    "feed error, frame treated as unreadable"
                );
                Reading::Unreadable
            }
            Err(e) => return Err(e),
        };
        let index = self.frames_read;
        self.frames_read += 1;
        Ok(Some((index, reading)))
    }

    fn end(&mut self, outcome: SyncOutcome) {
        self.state = TrackerState::Done;
        self.report.outcome = outcome;
    }

    fn seek_start(&mut self) -> Option<SyncResult<SyncPoint>> {
        loop {
            match self.pull() {
                Err(e) => {
                    self.end(SyncOutcome::StartNotFound);
                    return Some(Err(e));
                }
                Ok(None) => {
                    self.end(SyncOutcome::StartNotFound);
                    tracing::warn!(frames = self.frames_read, "video ended before match start");
                    return Some(Err(SyncError::StreamExhausted {
                        frames: self.frames_read,
                    }));
                }
                Ok(Some((index, Reading::Timer(t)))) if t == self.config.sentinel => {
                    return Some(self.start_tracking(index));
                }
                Ok(Some(_)) => {}
            }
        }
    }

    fn start_tracking(&mut self, origin: u64) -> SyncResult<SyncPoint> {
        let position = self.config.sentinel_position()?;
        // Consume the canonical sequence up to and including the sentinel.
        self.sequence.nth(position);
        self.state = TrackerState::Tracking;
        self.frames_behind = 0;
        self.report.origin_frame = Some(origin);
        self.report.points_emitted += 1;
        tracing::info!(
            frame = origin,
            sentinel = %self.config.sentinel,
            "Found match start after {} frames",
            origin + 1
        );
        Ok(SyncPoint {
            frame_index: origin,
            drift: 0,
        })
    }

    fn track(&mut self) -> Option<SyncResult<SyncPoint>> {
        loop {
            let Some(expected) = self.sequence.next() else {
                self.end(SyncOutcome::Complete);
                tracing::info!(
                    frames = self.frames_read,
                    drift = self.frames_behind,
                    "canonical sequence complete"
                );
                return None;
            };
            match self.pull() {
                Err(e) => {
                    self.end(SyncOutcome::StreamExhausted);
                    return Some(Err(e));
                }
                Ok(None) => {
                    self.end(SyncOutcome::StreamExhausted);
                    tracing::warn!(
                        frames = self.frames_read,
                        expected = %expected,
                        "video ended before the match clock did"
                    );
                    return Some(Err(SyncError::StreamExhausted {
                        frames: self.frames_read,
                    }));
                }
                Ok(Some((index, reading))) => {
                    if let Some(point) = self.step(index, expected, reading) {
                        return Some(Ok(point));
                    }
                }
            }
        }
    }

    fn step(&mut self, frame_index: u64, expected: Timestamp, reading: Reading) -> Option<SyncPoint> {
        let Reading::Timer(observed) = reading else {
            self.report.unreadable_frames += 1;
            tracing::debug!(frame = frame_index, expected = %expected, "unreadable timer");
            return None;
        };

        let d = observed.distance_to(&expected);
        let jump = d - self.frames_behind;

        if jump == 0 {
            self.report.points_emitted += 1;
            return Some(SyncPoint {
                frame_index,
                drift: self.frames_behind,
            });
        }

        let event = if jump == -1 {
            self.frames_behind = d;
            DriftEvent::RepeatedFrame {
                frame_index,
                expected,
                observed,
                frames_behind: d,
            }
        } else if jump > 0 && jump < self.config.max_jump {
            self.frames_behind = d;
            DriftEvent::DroppedFrames {
                frame_index,
                count: jump,
                expected,
                observed,
                frames_behind: d,
            }
        } else {
            DriftEvent::IgnoredJump {
                frame_index,
                jump,
                expected,
                observed,
            }
        };

        match event {
            DriftEvent::IgnoredJump { .. } => tracing::debug!("{event}"),
            _ => tracing::warn!("{event}"),
        }
        self.report.record(event);
        None
    }
}

impl<F: TimerFeed> Iterator for DriftTracker<F> {
    type Item = SyncResult<SyncPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            TrackerState::SeekingStart => self.seek_start(),
            TrackerState::Tracking => self.track(),
            TrackerState::Done => None,
        }
    }
}

impl<F: TimerFeed> FusedIterator for DriftTracker<F> {}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::source::MemoryFrameSource;
    use crate::test_utils::{render_timestamp, synthetic_classifier, synthetic_profile};
    use image::GrayImage;

    type ScriptedTracker = DriftTracker<IterFeed<std::vec::IntoIter<Option<Timestamp>>>>;

    /// `canonical_sequence(480)`; index 1 is the default sentinel.
    fn canonical(n: usize) -> Vec<Timestamp> {
        canonical_sequence(480).unwrap().take(n).collect()
    }

    fn tracker(readings: Vec<Option<Timestamp>>) -> ScriptedTracker {
        DriftTracker::new(IterFeed::new(readings), SyncConfig::default()).unwrap()
    }

    /// Drain a tracker, splitting points from the terminating error.
    fn drain(tracker: &mut ScriptedTracker) -> (Vec<SyncPoint>, Option<SyncError>) {
        let mut points = Vec::new();
        for item in tracker.by_ref() {
            match item {
                Ok(point) => points.push(point),
                Err(e) => return (points, Some(e)),
            }
        }
        (points, None)
    }

    /// Frame `i` shows canonical value `i + 1`, so frame 0 is the origin.
    fn aligned(c: &[Timestamp]) -> Vec<Option<Timestamp>> {
        c[1..].iter().copied().map(Some).collect()
    }

    fn point(frame_index: u64, drift: i64) -> SyncPoint {
        SyncPoint { frame_index, drift }
    }

    #[test]
    fn test_clean_stream_stays_on_track() {
        let c = canonical(101);
        let mut tracker = tracker(aligned(&c));
        let (points, err) = drain(&mut tracker);
        assert_eq!(points.len(), 100);
        assert!(points.iter().enumerate().all(|(i, p)| *p == point(i as u64, 0)));
        assert!(matches!(err, Some(SyncError::StreamExhausted { frames: 100 })));
        assert!(tracker.events().is_empty());
        assert_eq!(tracker.state(), TrackerState::Done);
    }

    #[test]
    fn test_origin_after_preroll() {
        let c = canonical(20);
        let mut readings = vec![None, Some(c[0]), None];
        readings.extend(aligned(&c));
        let mut tracker = tracker(readings);
        assert_eq!(tracker.state(), TrackerState::SeekingStart);
        assert_eq!(tracker.next().unwrap().unwrap(), point(3, 0));
        assert_eq!(tracker.origin(), Some(3));
        assert_eq!(tracker.state(), TrackerState::Tracking);
        assert_eq!(tracker.next().unwrap().unwrap(), point(4, 0));
    }

    #[test]
    fn test_duplicated_frame() {
        let c = canonical(120);
        let mut readings = aligned(&c[..=50]);
        readings.push(Some(c[50]));
        readings.extend(c[51..].iter().copied().map(Some));
        let mut tracker = tracker(readings);
        let (points, _) = drain(&mut tracker);

        assert_eq!(tracker.events().len(), 1);
        assert!(matches!(
            tracker.events()[0],
            DriftEvent::RepeatedFrame {
                frame_index: 50,
                frames_behind: -1,
                ..
            }
        ));
        assert_eq!(tracker.frames_behind(), -1);
        assert!(points.iter().all(|p| p.frame_index != 50));
        let resumed = points.iter().find(|p| p.frame_index == 51).unwrap();
        assert_eq!(resumed.drift, -1);
        assert_eq!(tracker.report().repeated_frames, 1);
    }

    #[test]
    fn test_five_dropped_frames() {
        let c = canonical(120);
        let mut readings = aligned(&c[..=30]);
        readings.extend(c[36..].iter().copied().map(Some));
        let mut tracker = tracker(readings);
        let (points, _) = drain(&mut tracker);

        assert_eq!(tracker.events().len(), 1);
        assert!(matches!(
            tracker.events()[0],
            DriftEvent::DroppedFrames {
                frame_index: 30,
                count: 5,
                frames_behind: 5,
                ..
            }
        ));
        assert_eq!(tracker.frames_behind(), 5);
        assert_eq!(points.iter().find(|p| p.frame_index == 31).unwrap().drift, 5);
        let report = tracker.report();
        assert_eq!(report.dropped_frames, 5);
        assert_eq!(report.final_drift, 5);
    }

    #[test]
    fn test_large_jump_ignored() {
        let c = canonical(120);
        let mut readings = aligned(&c);
        readings[20] = Some(c[21 + 40]);
        let mut tracker = tracker(readings);
        let (points, _) = drain(&mut tracker);

        assert!(matches!(
            tracker.events(),
            [DriftEvent::IgnoredJump {
                frame_index: 20,
                jump: 40,
                ..
            }]
        ));
        assert_eq!(tracker.frames_behind(), 0);
        assert!(points.iter().all(|p| p.frame_index != 20));
        assert_eq!(points.iter().find(|p| p.frame_index == 21).unwrap().drift, 0);
    }

    #[test]
    fn test_jump_at_limit_ignored() {
        let c = canonical(120);
        let mut readings = aligned(&c);
        readings[20] = Some(c[21 + 30]);
        readings[40] = Some(c[41 + 29]);
        let mut tracker = tracker(readings);
        drain(&mut tracker);
        let events = tracker.events();
        assert!(matches!(events[0], DriftEvent::IgnoredJump { jump: 30, .. }));
        assert!(matches!(events[1], DriftEvent::DroppedFrames { count: 29, .. }));
    }

    #[test]
    fn test_backwards_jump_ignored() {
        let c = canonical(60);
        let mut readings = aligned(&c);
        readings[20] = Some(c[18]);
        let mut tracker = tracker(readings);
        drain(&mut tracker);
        assert!(matches!(
            tracker.events(),
            [DriftEvent::IgnoredJump { jump: -3, .. }]
        ));
        assert_eq!(tracker.frames_behind(), 0);
    }

    #[test]
    fn test_unreadable_mid_run() {
        let c = canonical(60);
        let mut readings = aligned(&c);
        readings[20] = None;
        let mut tracker = tracker(readings);
        let (points, _) = drain(&mut tracker);

        assert!(tracker.events().is_empty());
        assert_eq!(tracker.frames_behind(), 0);
        assert!(points.iter().all(|p| p.frame_index != 20));
        assert_eq!(points.iter().find(|p| p.frame_index == 21).unwrap().drift, 0);
        assert_eq!(tracker.report().unreadable_frames, 1);
    }

    #[test]
    fn test_stream_exhausted_before_start() {
        let mut tracker = tracker(vec![None; 7]);
        let err = tracker.next().unwrap().unwrap_err();
        assert!(matches!(err, SyncError::StreamExhausted { frames: 7 }));
        assert!(tracker.next().is_none());
        assert_eq!(tracker.report().outcome, SyncOutcome::StartNotFound);
    }

    #[test]
    fn test_stream_exhausted_is_yielded_once() {
        let c = canonical(10);
        let mut tracker = tracker(aligned(&c));
        let (points, err) = drain(&mut tracker);
        assert_eq!(points.len(), 9);
        assert!(err.is_some());
        assert!(tracker.next().is_none());
        assert!(tracker.next().is_none());
        assert_eq!(tracker.report().outcome, SyncOutcome::StreamExhausted);
    }

    #[test]
    fn test_full_short_match_completes() {
        let config = SyncConfig::default()
            .with_start_seconds(6)
            .with_sentinel("000599".parse().unwrap());
        let c: Vec<Timestamp> = canonical_sequence(6).unwrap().collect();
        let mut tracker = DriftTracker::new(IterFeed::new(aligned(&c)), config).unwrap();
        assert_eq!(tracker.remaining(), 60);
        let points: Vec<_> = tracker.by_ref().map(Result::unwrap).collect();
        assert_eq!(points.len(), 59);
        assert_eq!(tracker.remaining(), 0);
        let report = tracker.report();
        assert_eq!(report.outcome, SyncOutcome::Complete);
        assert_eq!(report.frames_read, 59);
        assert_eq!(report.points_emitted, 59);
        assert!(report.is_clean());
    }

    #[test]
    fn test_finish_returns_report() {
        let config = SyncConfig::default()
            .with_start_seconds(6)
            .with_sentinel("000599".parse().unwrap());
        let c: Vec<Timestamp> = canonical_sequence(6).unwrap().collect();
        let report = DriftTracker::new(IterFeed::new(aligned(&c)), config)
            .unwrap()
            .finish()
            .unwrap();
        assert_eq!(report.outcome, SyncOutcome::Complete);
        assert_eq!(report.origin_frame, Some(0));
    }

    #[test]
    fn test_one_frame_per_canonical_value() {
        let c = canonical(80);
        let mut readings = aligned(&c);
        readings[5] = None;
        readings[10] = Some(c[11 + 40]);
        let mut tracker = tracker(readings);
        for _ in 0..20 {
            tracker.next();
        }
        let consumed = 28_500 - tracker.remaining();
        // The sentinel frame consumes two canonical values, every later frame one.
        assert_eq!(consumed as u64, tracker.report().frames_read + 1);
    }

    #[test]
    fn test_sentinel_not_in_sequence() {
        let config = SyncConfig::default().with_start_seconds(60);
        let err = DriftTracker::new(IterFeed::new(Vec::new()), config).unwrap_err();
        assert!(matches!(err, SyncError::Configuration { .. }));
    }

    struct FailingFeed;

    impl TimerFeed for FailingFeed {
        fn next_reading(&mut self) -> SyncResult<Option<Reading>> {
            Err(SyncError::ffmpeg("decoder crashed"))
        }
    }

    #[test]
    fn test_feed_error_ends_run() {
        let mut tracker = DriftTracker::new(FailingFeed, SyncConfig::default()).unwrap();
        assert!(matches!(
            tracker.next(),
            Some(Err(SyncError::Ffmpeg { .. }))
        ));
        assert!(tracker.next().is_none());
    }

    /// Replays a fixed script of feed results.
    struct ScriptedFeed(std::vec::IntoIter<SyncResult<Reading>>);

    impl TimerFeed for ScriptedFeed {
        fn next_reading(&mut self) -> SyncResult<Option<Reading>> {
            self.0.next().transpose()
        }
    }

    #[test]
    fn test_recoverable_feed_error_counts_as_unreadable() {
        let c = canonical(30);
        let mut script: Vec<SyncResult<Reading>> =
            c[1..].iter().map(|t| Ok(Reading::Timer(*t))).collect();
        script[10] = Err(SyncError::UnreadableFrame {
            message: "garbled digits".to_string(),
        });
        script[0] = Err(SyncError::invalid_timestamp("075997", "never displayed"));
        script.insert(1, Ok(Reading::Timer(c[1])));
        let feed = ScriptedFeed(script.into_iter());
        let mut tracker = DriftTracker::new(feed, SyncConfig::default()).unwrap();

        let mut points = Vec::new();
        let mut last_err = None;
        for item in tracker.by_ref() {
            match item {
                Ok(point) => points.push(point),
                Err(e) => last_err = Some(e),
            }
        }

        assert_eq!(tracker.origin(), Some(1));
        assert_eq!(tracker.report().unreadable_frames, 1);
        assert!(points.iter().all(|p| p.frame_index != 11 && p.drift == 0));
        assert!(matches!(last_err, Some(SyncError::StreamExhausted { .. })));
    }

    #[test]
    fn test_reading_from_option() {
        let t: Timestamp = "075999".parse().unwrap();
        assert_eq!(Reading::from(Some(t)), Reading::Timer(t));
        assert_eq!(Reading::from(None), Reading::Unreadable);
    }

    #[test]
    fn test_end_to_end_rendered_frames() {
        let profile = synthetic_profile();
        let classifier = synthetic_classifier();
        let reader = TimestampReader::new(profile.clone(), classifier.clone()).unwrap();
        let glyphs = classifier.glyphs().clone();

        let c: Vec<Timestamp> = canonical_sequence(6).unwrap().collect();
        let mut shown: Vec<Timestamp> = c[1..=20].to_vec();
        shown.push(c[20]);
        shown.extend_from_slice(&c[21..40]);
        shown.extend_from_slice(&c[41..]);

        let mut frames = vec![GrayImage::new(profile.width, profile.height); 3];
        frames.extend(shown.iter().map(|t| render_timestamp(&profile, &glyphs, t)));

        let config = SyncConfig::default()
            .with_start_seconds(6)
            .with_sentinel("000599".parse().unwrap());
        let feed = ReaderFeed::new(MemoryFrameSource::new(frames), reader);
        let mut tracker = DriftTracker::new(feed, config).unwrap();
        let points: Vec<_> = tracker.by_ref().map(Result::unwrap).collect();

        let report = tracker.report();
        assert_eq!(report.outcome, SyncOutcome::Complete);
        assert_eq!(report.origin_frame, Some(3));
        assert_eq!(points[0], point(3, 0));
        assert_eq!(report.repeated_frames, 1);
        assert_eq!(report.drop_events, 1);
        assert_eq!(report.dropped_frames, 1);
        assert_eq!(report.final_drift, 0);
        assert_eq!(report.unreadable_frames, 0);
        assert_eq!(points.len(), 57);
        assert_eq!(points[20], point(24, -1));
        assert_eq!(points.last().unwrap(), &point(61, 0));
    }

    #[test]
    fn test_reader_feed_rejects_wrong_frame_size() {
        let reader = TimestampReader::new(synthetic_profile(), synthetic_classifier()).unwrap();
        let mut feed = ReaderFeed::new(MemoryFrameSource::new([GrayImage::new(3, 3)]), reader);
        assert!(feed.next_reading().is_err());
    }
}
