//! Template matching: score how well a glyph matches an area of a frame.
//!
//! The classifier only needs the best confidence per glyph, so matchers are
//! opaque scorers behind [`TemplateMatcher`]. [`NccMatcher`] is the default:
//! zero-mean normalized cross-correlation over every placement of the
//! template inside the search rectangle.

use image::{imageops::FilterType, GrayImage};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of top-left corner
    pub x: u32,
    /// Y coordinate of top-left corner
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Check if a point is within this rectangle
    #[must_use]
    pub const fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Whether the rectangle lies entirely inside a `width` x `height` frame
    #[must_use]
    pub const fn fits_within(&self, width: u32, height: u32) -> bool {
        if self.width == 0 || self.height == 0 {
            return false;
        }
        match (self.x.checked_add(self.width), self.y.checked_add(self.height)) {
            (Some(right), Some(bottom)) => right <= width && bottom <= height,
            _ => false,
        }
    }

    /// Intersection with another rectangle, `None` if they do not overlap
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        (right > x && bottom > y).then(|| Self::new(x, y, right - x, bottom - y))
    }
}

/// One placement of a template and its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchCandidate {
    /// X of the template's top-left corner in the scene
    pub x: u32,
    /// Y of the template's top-left corner in the scene
    pub y: u32,
    /// Match confidence; 1.0 is a perfect match
    pub confidence: f32,
}

/// Scores placements of a template within a scene.
pub trait TemplateMatcher: Send + Sync {
    /// Score every placement of `template` (resized by `scale`) that fits
    /// inside `search` (or the whole scene when `None`).
    fn match_template(
        &self,
        template: &GrayImage,
        scene: &GrayImage,
        scale: f32,
        search: Option<Rect>,
    ) -> Vec<MatchCandidate>;

    /// Highest confidence among all placements, 0.0 when nothing fits.
    fn best_confidence(
        &self,
        template: &GrayImage,
        scene: &GrayImage,
        scale: f32,
        search: Option<Rect>,
    ) -> f32 {
        self.match_template(template, scene, scale, search)
            .iter()
            .map(|c| c.confidence)
            .fold(0.0, f32::max)
    }
}

/// Zero-mean normalized cross-correlation matcher.
///
/// Confidence lies in `[-1, 1]`. Placements where either the template or the
/// scene window has no variance score 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct NccMatcher;

impl NccMatcher {
    /// Create a new matcher
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TemplateMatcher for NccMatcher {
    fn match_template(
        &self,
        template: &GrayImage,
        scene: &GrayImage,
        scale: f32,
        search: Option<Rect>,
    ) -> Vec<MatchCandidate> {
        let resized;
        let template = if (scale - 1.0).abs() > f32::EPSILON && scale > 0.0 {
            let w = ((template.width() as f32) * scale).round().max(1.0) as u32;
            let h = ((template.height() as f32) * scale).round().max(1.0) as u32;
            resized = image::imageops::resize(template, w, h, FilterType::Triangle);
            &resized
        } else {
            template
        };

        let frame = Rect::new(0, 0, scene.width(), scene.height());
        let Some(area) = search.map_or(Some(frame), |s| s.intersect(&frame)) else {
            return Vec::new();
        };
        let (tw, th) = template.dimensions();
        if tw == 0 || th == 0 || tw > area.width || th > area.height {
            return Vec::new();
        }

        let prepared = PreparedTemplate::new(template);
        let mut candidates =
            Vec::with_capacity(((area.width - tw + 1) * (area.height - th + 1)) as usize);
        for y in area.y..=area.bottom() - th {
            for x in area.x..=area.right() - tw {
                candidates.push(MatchCandidate {
                    x,
                    y,
                    confidence: prepared.correlate(scene, x, y),
                });
            }
        }
        candidates
    }
}

/// Template pixels with their mean removed, plus the centered energy.
struct PreparedTemplate {
    width: u32,
    height: u32,
    centered: Vec<f64>,
    energy: f64,
}

impl PreparedTemplate {
    fn new(template: &GrayImage) -> Self {
        let n = template.as_raw().len() as f64;
        let mean = template.as_raw().iter().map(|&p| f64::from(p)).sum::<f64>() / n;
        let centered: Vec<f64> = template
            .as_raw()
            .iter()
            .map(|&p| f64::from(p) - mean)
            .collect();
        let energy = centered.iter().map(|v| v * v).sum();
        Self {
            width: template.width(),
            height: template.height(),
            centered,
            energy,
        }
    }

    fn correlate(&self, scene: &GrayImage, x0: u32, y0: u32) -> f32 {
        let stride = scene.width() as usize;
        let raw = scene.as_raw();
        let n = self.centered.len() as f64;
        let (mut sum, mut sum_sq, mut cross) = (0.0f64, 0.0f64, 0.0f64);

        for ty in 0..self.height as usize {
            let row = (y0 as usize + ty) * stride + x0 as usize;
            let window = &raw[row..row + self.width as usize];
            let tmpl = &self.centered[ty * self.width as usize..(ty + 1) * self.width as usize];
            for (&p, &t) in window.iter().zip(tmpl) {
                let v = f64::from(p);
                sum += v;
                sum_sq += v * v;
                cross += t * v;
            }
        }

        let window_energy = sum_sq - sum * sum / n;
        let denom = (self.energy * window_energy).sqrt();
        if denom <= f64::EPSILON {
            return 0.0;
        }
        (cross / denom).clamp(-1.0, 1.0) as f32
    }
}
