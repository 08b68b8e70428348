//! Capture profiles: where the timer digits sit in a recorded frame.
//!
//! A profile ties a capture resolution to the six digit regions of the match
//! clock, in `MMSSCC` order. Profiles are plain configuration and load from
//! YAML; one built-in profile covers the reference recording setup.

use crate::digits::DigitSize;
use crate::matching::Rect;
use crate::result::{SyncError, SyncResult};
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the built-in profile for 643x528 emulator captures.
pub const DOLPHIN_643X528: &str = "dolphin-643x528";

/// Default darkness threshold: pixels at or below are zeroed before matching.
pub const DEFAULT_DARKNESS_THRESHOLD: u8 = 200;

/// Number of digits on the match clock.
pub const DIGIT_COUNT: usize = 6;

/// A rectangle holding exactly one timer digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitRegion {
    /// Area searched for the digit
    pub rect: Rect,
    /// Size at which the digit is drawn
    pub size: DigitSize,
}

impl DigitRegion {
    /// Create a new region
    #[must_use]
    pub const fn new(rect: Rect, size: DigitSize) -> Self {
        Self { rect, size }
    }
}

/// Capture format and timer layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureProfile {
    /// Profile name
    pub name: String,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Threshold applied before matching (default: 200)
    #[serde(default = "default_darkness_threshold")]
    pub darkness_threshold: u8,
    /// Six regions: minute tens, minute ones, second tens, second ones,
    /// centisecond tens, centisecond ones
    pub regions: Vec<DigitRegion>,
}

const fn default_darkness_threshold() -> u8 {
    DEFAULT_DARKNESS_THRESHOLD
}

impl CaptureProfile {
    /// The 643x528 emulator capture layout.
    #[must_use]
    pub fn dolphin_643x528() -> Self {
        let large = |x| DigitRegion::new(Rect::new(x, 56, 30, 32), DigitSize::Large);
        let small = |x| DigitRegion::new(Rect::new(x, 62, 25, 27), DigitSize::Small);
        Self {
            name: DOLPHIN_643X528.to_string(),
            width: 643,
            height: 528,
            darkness_threshold: DEFAULT_DARKNESS_THRESHOLD,
            regions: vec![large(243), large(271), large(313), large(341), small(375), small(396)],
        }
    }

    /// Names of all built-in profiles
    #[must_use]
    pub const fn builtin_names() -> &'static [&'static str] {
        &[DOLPHIN_643X528]
    }

    /// Look up a built-in profile by name
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            DOLPHIN_643X528 => Some(Self::dolphin_643x528()),
            _ => None,
        }
    }

    /// Look up a built-in profile, failing with a configuration error.
    pub fn resolve(name: &str) -> SyncResult<Self> {
        Self::builtin(name).ok_or_else(|| {
            SyncError::configuration(format!(
                "unknown capture profile '{name}' (available: {})",
                Self::builtin_names().join(", ")
            ))
        })
    }

    /// Parse and validate a profile from YAML text
    pub fn from_yaml_str(yaml: &str) -> SyncResult<Self> {
        let profile: Self = serde_yaml_ng::from_str(yaml)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load and validate a profile from a YAML file
    pub fn from_file(path: &Path) -> SyncResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Check that the profile describes six regions inside the frame.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Configuration` naming the first problem found.
    pub fn validate(&self) -> SyncResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SyncError::configuration(format!(
                "profile '{}' has an empty resolution {}x{}",
                self.name, self.width, self.height
            )));
        }
        if self.regions.len() != DIGIT_COUNT {
            return Err(SyncError::configuration(format!(
                "profile '{}' defines {} digit regions, expected {DIGIT_COUNT}",
                self.name,
                self.regions.len()
            )));
        }
        for (i, region) in self.regions.iter().enumerate() {
            if !region.rect.fits_within(self.width, self.height) {
                return Err(SyncError::configuration(format!(
                    "profile '{}' region {i} at ({}, {}) size {}x{} exceeds {}x{} frame",
                    self.name,
                    region.rect.x,
                    region.rect.y,
                    region.rect.width,
                    region.rect.height,
                    self.width,
                    self.height
                )));
            }
        }
        Ok(())
    }

    /// Check that a frame has this profile's resolution
    pub fn check_frame(&self, frame: &GrayImage) -> SyncResult<()> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(SyncError::configuration(format!(
                "frame is {}x{} but profile '{}' expects {}x{}",
                frame.width(),
                frame.height(),
                self.name,
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    /// Set darkness threshold
    #[must_use]
    pub const fn with_darkness_threshold(mut self, threshold: u8) -> Self {
        self.darkness_threshold = threshold;
        self
    }
}

impl Default for CaptureProfile {
    fn default() -> Self {
        Self::dolphin_643x528()
    }
}
