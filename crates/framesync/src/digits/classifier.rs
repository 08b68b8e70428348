//! Single-digit recognition by template matching.

use super::assets::{AssetStore, GlyphColor};
use super::glyphs::{GlyphScale, GlyphTable};
use crate::matching::{NccMatcher, TemplateMatcher};
use crate::profile::DigitRegion;
use crate::result::{SyncError, SyncResult};
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default minimum confidence a winning digit must exceed.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.4;

/// Configuration for digit classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Winning score must be strictly greater than this (default: 0.4)
    pub min_confidence: f32,
    /// Corrections applied when building the glyph table
    pub glyph_scale: GlyphScale,
    /// Extra scale passed to the matcher (default: 1.0)
    pub match_scale: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            glyph_scale: GlyphScale::default(),
            match_scale: 1.0,
        }
    }
}

impl ClassifierConfig {
    /// Set minimum confidence
    #[must_use]
    pub const fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Set glyph scale factors
    #[must_use]
    pub const fn with_glyph_scale(mut self, glyph_scale: GlyphScale) -> Self {
        self.glyph_scale = glyph_scale;
        self
    }

    /// Set matcher scale
    #[must_use]
    pub const fn with_match_scale(mut self, match_scale: f32) -> Self {
        self.match_scale = match_scale;
        self
    }

    /// Check tuning values
    pub fn validate(&self) -> SyncResult<()> {
        if !self.min_confidence.is_finite() || self.min_confidence >= 1.0 {
            return Err(SyncError::configuration(format!(
                "min_confidence must be finite and below 1.0, got {}",
                self.min_confidence
            )));
        }
        if !self.match_scale.is_finite() || self.match_scale <= 0.0 {
            return Err(SyncError::configuration(format!(
                "match_scale must be positive, got {}",
                self.match_scale
            )));
        }
        self.glyph_scale.validate()
    }
}

/// Winning digit of a region and its score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DigitScore {
    /// Digit 0-9
    pub digit: u8,
    /// Best match confidence for that digit
    pub confidence: f32,
}

/// Recognizes the digit shown in one region of a frame.
///
/// Every digit is scored with both color variants of its glyph at the
/// region's size; the variant with the better score counts.
#[derive(Clone)]
pub struct DigitClassifier {
    glyphs: Arc<GlyphTable>,
    matcher: Arc<dyn TemplateMatcher>,
    config: ClassifierConfig,
}

impl fmt::Debug for DigitClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigitClassifier")
            .field("glyphs", &self.glyphs.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DigitClassifier {
    /// Create a classifier over a prepared glyph table.
    #[must_use]
    pub fn new(glyphs: Arc<GlyphTable>, config: ClassifierConfig) -> Self {
        Self {
            glyphs,
            matcher: Arc::new(NccMatcher::new()),
            config,
        }
    }

    /// Validate `config`, build the glyph table from `store`, and wrap it.
    ///
    /// # Errors
    ///
    /// Returns configuration errors or the first asset failure.
    pub fn from_store(store: &dyn AssetStore, config: ClassifierConfig) -> SyncResult<Self> {
        config.validate()?;
        let table = GlyphTable::build(store, &config.glyph_scale)?;
        Ok(Self::new(Arc::new(table), config))
    }

    /// Replace the template matcher
    #[must_use]
    pub fn with_matcher(mut self, matcher: Arc<dyn TemplateMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Shared glyph table
    #[must_use]
    pub const fn glyphs(&self) -> &Arc<GlyphTable> {
        &self.glyphs
    }

    /// Score of every digit 0-9 inside `region`.
    #[must_use]
    pub fn scores(&self, scene: &GrayImage, region: &DigitRegion) -> [f32; 10] {
        let mut scores = [0.0f32; 10];
        for (digit, score) in (0u8..).zip(scores.iter_mut()) {
            *score = GlyphColor::ALL
                .into_iter()
                .map(|color| {
                    let glyph = self.glyphs.get(digit, region.size, color);
                    self.matcher.best_confidence(
                        glyph,
                        scene,
                        self.config.match_scale,
                        Some(region.rect),
                    )
                })
                .fold(0.0, f32::max);
        }
        scores
    }

    /// Highest scoring digit, ties going to the lower digit.
    #[must_use]
    pub fn best(&self, scene: &GrayImage, region: &DigitRegion) -> DigitScore {
        let scores = self.scores(scene, region);
        tracing::trace!(
            x = region.rect.x,
            y = region.rect.y,
            scores = ?scores,
            "digit scores"
        );
        pick_best(&scores)
    }

    /// Recognized digit, or `None` when the best score does not exceed
    /// the minimum confidence.
    #[must_use]
    pub fn classify(&self, scene: &GrayImage, region: &DigitRegion) -> Option<u8> {
        let best = self.best(scene, region);
        (best.confidence > self.config.min_confidence).then_some(best.digit)
    }
}

fn pick_best(scores: &[f32; 10]) -> DigitScore {
    let mut best = DigitScore {
        digit: 0,
        confidence: scores[0],
    };
    for (digit, &confidence) in (0u8..).zip(scores.iter()).skip(1) {
        if confidence > best.confidence {
            best = DigitScore { digit, confidence };
        }
    }
    best
}
