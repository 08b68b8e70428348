//! Synthetic glyphs and frames shared by unit tests.
//!
//! Digits are drawn as blocky seven-segment figures: bright strokes on a
//! black background for the black variant, the inverse for the white one.
//! Large and small glyphs have different dimensions so size mix-ups show.

use crate::digits::{
    ClassifierConfig, DigitClassifier, DigitSize, GlyphColor, GlyphKey, GlyphScale, GlyphTable,
    MemoryAssetStore,
};
use crate::matching::Rect;
use crate::profile::{CaptureProfile, DigitRegion};
use crate::timer::Timestamp;
use image::{DynamicImage, GrayImage, Luma};
use std::sync::Arc;

pub(crate) const LARGE_GLYPH: (u32, u32) = (12, 20);
pub(crate) const SMALL_GLYPH: (u32, u32) = (9, 15);
const STROKE: u32 = 2;

// Segments a..g, clockwise from the top, then the middle bar.
const SEGMENTS: [[bool; 7]; 10] = [
    [true, true, true, true, true, true, false],
    [false, true, true, false, false, false, false],
    [true, true, false, true, true, false, true],
    [true, true, true, true, false, false, true],
    [false, true, true, false, false, true, true],
    [true, false, true, true, false, true, true],
    [true, false, true, true, true, true, true],
    [true, true, true, false, false, false, false],
    [true, true, true, true, true, true, true],
    [true, true, true, true, false, true, true],
];

/// Black-variant seven-segment glyph for `digit`.
pub(crate) fn seven_segment_glyph(digit: u8, width: u32, height: u32) -> GrayImage {
    let lit = SEGMENTS[usize::from(digit)];
    let mid = height / 2;
    GrayImage::from_fn(width, height, |x, y| {
        let left = x < STROKE;
        let right = x >= width - STROKE;
        let top_half = y < mid;
        let on = (lit[0] && y < STROKE)
            || (lit[1] && right && top_half)
            || (lit[2] && right && !top_half)
            || (lit[3] && y >= height - STROKE)
            || (lit[4] && left && !top_half)
            || (lit[5] && left && top_half)
            || (lit[6] && y + STROKE / 2 >= mid && y < mid + STROKE / 2);
        if on {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Store holding all 40 synthetic glyphs.
pub(crate) fn synthetic_asset_store() -> MemoryAssetStore {
    let mut store = MemoryAssetStore::new();
    for key in GlyphKey::all() {
        let (w, h) = match key.size {
            DigitSize::Small => SMALL_GLYPH,
            DigitSize::Large => LARGE_GLYPH,
        };
        let mut glyph = seven_segment_glyph(key.digit, w, h);
        if key.color == GlyphColor::White {
            image::imageops::invert(&mut glyph);
        }
        store.insert(key, DynamicImage::ImageLuma8(glyph));
    }
    store
}

/// Glyph table over the synthetic store, without rescaling.
pub(crate) fn synthetic_table() -> Arc<GlyphTable> {
    Arc::new(
        GlyphTable::build(&synthetic_asset_store(), &GlyphScale::identity())
            .expect("synthetic store is complete"),
    )
}

/// Classifier over [`synthetic_table`].
pub(crate) fn synthetic_classifier() -> DigitClassifier {
    DigitClassifier::new(
        synthetic_table(),
        ClassifierConfig::default().with_glyph_scale(GlyphScale::identity()),
    )
}

/// A 100x32 profile with a two-pixel margin around every glyph.
pub(crate) fn synthetic_profile() -> CaptureProfile {
    let (lw, lh) = LARGE_GLYPH;
    let (sw, sh) = SMALL_GLYPH;
    let large = |x| DigitRegion::new(Rect::new(x, 4, lw + 4, lh + 4), DigitSize::Large);
    let small = |x| DigitRegion::new(Rect::new(x, 8, sw + 4, sh + 4), DigitSize::Small);
    CaptureProfile {
        name: "synthetic".to_string(),
        width: 100,
        height: 32,
        darkness_threshold: 200,
        regions: vec![large(2), large(18), large(36), large(52), small(70), small(84)],
    }
}

/// Frame showing `digits`, each black glyph centered in its region.
pub(crate) fn render_digits(
    profile: &CaptureProfile,
    table: &GlyphTable,
    digits: [u8; 6],
) -> GrayImage {
    let mut frame = GrayImage::new(profile.width, profile.height);
    for (region, digit) in profile.regions.iter().zip(digits) {
        let glyph = table.get(digit, region.size, GlyphColor::Black);
        let x = region.rect.x + region.rect.width.saturating_sub(glyph.width()) / 2;
        let y = region.rect.y + region.rect.height.saturating_sub(glyph.height()) / 2;
        image::imageops::replace(&mut frame, glyph, i64::from(x), i64::from(y));
    }
    frame
}

/// Frame showing `timestamp`.
pub(crate) fn render_timestamp(
    profile: &CaptureProfile,
    table: &GlyphTable,
    timestamp: &Timestamp,
) -> GrayImage {
    let mut digits = [0u8; 6];
    for (slot, b) in digits.iter_mut().zip(timestamp.to_string().bytes()) {
        *slot = b - b'0';
    }
    render_digits(profile, table, digits)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_glyphs_are_distinct() {
        let glyphs: Vec<_> = (0..10).map(|d| seven_segment_glyph(d, 12, 20)).collect();
        for i in 0..10 {
            for j in (i + 1)..10 {
                assert_ne!(glyphs[i], glyphs[j], "{i} vs {j}");
            }
        }
    }

    #[test]
    fn test_synthetic_profile_is_valid() {
        assert!(synthetic_profile().validate().is_ok());
    }
}
