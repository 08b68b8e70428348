//! Reads the full match clock from a frame.

use crate::digits::{DigitClassifier, DigitScore};
use crate::profile::CaptureProfile;
use crate::result::SyncResult;
use crate::timer::Timestamp;
use image::{GrayImage, Luma};
use std::path::Path;

/// Load a still frame from disk as 8-bit grayscale.
pub fn load_frame(path: &Path) -> SyncResult<GrayImage> {
    Ok(image::open(path)?.to_luma8())
}

/// Zero every pixel at or below `threshold`, keep the rest.
#[must_use]
pub fn threshold_to_zero(frame: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = frame.clone();
    for pixel in out.pixels_mut() {
        if pixel.0[0] <= threshold {
            *pixel = Luma([0]);
        }
    }
    out
}

/// Turns frames into timestamps using a capture profile and a classifier.
#[derive(Debug, Clone)]
pub struct TimestampReader {
    profile: CaptureProfile,
    classifier: DigitClassifier,
}

impl TimestampReader {
    /// Create a reader.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Configuration` if the profile is invalid.
    pub fn new(profile: CaptureProfile, classifier: DigitClassifier) -> SyncResult<Self> {
        profile.validate()?;
        Ok(Self {
            profile,
            classifier,
        })
    }

    /// Active capture profile
    #[must_use]
    pub const fn profile(&self) -> &CaptureProfile {
        &self.profile
    }

    /// Digit classifier
    #[must_use]
    pub const fn classifier(&self) -> &DigitClassifier {
        &self.classifier
    }

    /// Read the timestamp shown in `frame`.
    ///
    /// `None` when any digit is unknown or the digits do not form a
    /// displayable reading.
    #[must_use]
    pub fn read(&self, frame: &GrayImage) -> Option<Timestamp> {
        let prepared = threshold_to_zero(frame, self.profile.darkness_threshold);
        let mut text = String::with_capacity(self.profile.regions.len());
        for (i, region) in self.profile.regions.iter().enumerate() {
            let Some(digit) = self.classifier.classify(&prepared, region) else {
                tracing::trace!(region = i, "digit not recognized");
                return None;
            };
            text.push(char::from(b'0' + digit));
        }
        match text.parse() {
            Ok(timestamp) => Some(timestamp),
            Err(e) => {
                tracing::trace!(digits = %text, error = %e, "digits are not a clock reading");
                None
            }
        }
    }

    /// Like [`read`](Self::read), after checking the frame resolution.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Configuration` when the frame size differs from
    /// the profile's.
    pub fn read_checked(&self, frame: &GrayImage) -> SyncResult<Option<Timestamp>> {
        self.profile.check_frame(frame)?;
        Ok(self.read(frame))
    }

    /// Best digit and score per region, for diagnostics.
    #[must_use]
    pub fn region_scores(&self, frame: &GrayImage) -> Vec<DigitScore> {
        let prepared = threshold_to_zero(frame, self.profile.darkness_threshold);
        self.profile
            .regions
            .iter()
            .map(|region| self.classifier.best(&prepared, region))
            .collect()
    }
}
