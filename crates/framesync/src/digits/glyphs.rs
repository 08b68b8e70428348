//! Pre-scaled, read-only glyph table.
//!
//! The stored assets are slightly narrower than the digits the game renders,
//! and the two timer sizes are drawn at different scales. Each asset is
//! stretched horizontally, then scaled uniformly per size, exactly once.

use super::assets::{AssetStore, DigitSize, GlyphColor, GlyphKey};
use crate::result::{SyncError, SyncResult};
use image::{imageops::FilterType, DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};

/// Geometric correction applied to raw assets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphScale {
    /// Horizontal stretch applied to every asset (default: 39/37)
    pub stretch_x: f32,
    /// Vertical stretch applied to every asset (default: 1.0)
    pub stretch_y: f32,
    /// Uniform scale for small digits (default: 21/24)
    pub small: f32,
    /// Uniform scale for large digits (default: 26/24)
    pub large: f32,
}

impl Default for GlyphScale {
    fn default() -> Self {
        Self {
            stretch_x: 39.0 / 37.0,
            stretch_y: 1.0,
            small: 21.0 / 24.0,
            large: 26.0 / 24.0,
        }
    }
}

impl GlyphScale {
    /// No rescaling at all
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            stretch_x: 1.0,
            stretch_y: 1.0,
            small: 1.0,
            large: 1.0,
        }
    }

    /// Uniform factor for a size hint
    #[must_use]
    pub const fn for_size(&self, size: DigitSize) -> f32 {
        match size {
            DigitSize::Small => self.small,
            DigitSize::Large => self.large,
        }
    }

    /// Reject non-positive or non-finite factors
    pub fn validate(&self) -> SyncResult<()> {
        for (name, v) in [
            ("stretch_x", self.stretch_x),
            ("stretch_y", self.stretch_y),
            ("small", self.small),
            ("large", self.large),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(SyncError::configuration(format!(
                    "glyph scale {name} must be positive, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Every glyph the classifier compares against, ready to match.
#[derive(Debug, Clone)]
pub struct GlyphTable {
    glyphs: Vec<GrayImage>,
}

impl GlyphTable {
    /// Load and prepare all 40 glyphs from `store`.
    ///
    /// # Errors
    ///
    /// Fails on the first asset the store cannot provide.
    pub fn build(store: &dyn AssetStore, scale: &GlyphScale) -> SyncResult<Self> {
        scale.validate()?;
        let glyphs = GlyphKey::all()
            .map(|key| {
                let raw = store.load(&key)?;
                let glyph = prepare_glyph(&raw, key.size, scale);
                tracing::trace!(
                    glyph = %key,
                    width = glyph.width(),
                    height = glyph.height(),
                    "prepared glyph"
                );
                Ok(glyph)
            })
            .collect::<SyncResult<Vec<_>>>()?;
        tracing::debug!(count = glyphs.len(), "glyph table built");
        Ok(Self { glyphs })
    }

    /// Prepared glyph for a key
    #[must_use]
    pub fn get(&self, digit: u8, size: DigitSize, color: GlyphColor) -> &GrayImage {
        &self.glyphs[slot(digit, size, color)]
    }

    /// Number of glyphs held
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Whether the table holds no glyphs
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

// Matches the iteration order of `GlyphKey::all`.
fn slot(digit: u8, size: DigitSize, color: GlyphColor) -> usize {
    let size_idx = match size {
        DigitSize::Small => 0,
        DigitSize::Large => 1,
    };
    let color_idx = match color {
        GlyphColor::Black => 0,
        GlyphColor::White => 1,
    };
    usize::from(digit.min(9)) * 4 + size_idx * 2 + color_idx
}

/// Convert an asset to grayscale and apply the size correction.
#[must_use]
pub fn prepare_glyph(raw: &DynamicImage, size: DigitSize, scale: &GlyphScale) -> GrayImage {
    let gray = raw.to_luma8();
    let stretched = resize_by(&gray, scale.stretch_x, scale.stretch_y);
    let factor = scale.for_size(size);
    resize_by(&stretched, factor, factor)
}

fn resize_by(img: &GrayImage, fx: f32, fy: f32) -> GrayImage {
    let w = ((img.width() as f32) * fx).round().max(1.0) as u32;
    let h = ((img.height() as f32) * fy).round().max(1.0) as u32;
    if (w, h) == img.dimensions() {
        return img.clone();
    }
    image::imageops::resize(img, w, h, FilterType::Triangle)
}
