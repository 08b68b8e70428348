//! Glyph asset lookup.

use crate::result::{SyncError, SyncResult};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Rendered size of a timer digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigitSize {
    /// Centisecond digits
    Small,
    /// Minute and second digits
    Large,
}

impl DigitSize {
    /// Both sizes
    pub const ALL: [Self; 2] = [Self::Small, Self::Large];
}

impl fmt::Display for DigitSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Small => write!(f, "small"),
            Self::Large => write!(f, "large"),
        }
    }
}

/// Color scheme of a glyph asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphColor {
    /// Digit on a black background
    Black,
    /// Digit on a white background
    White,
}

impl GlyphColor {
    /// Both color schemes
    pub const ALL: [Self; 2] = [Self::Black, Self::White];

    const fn file_tag(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
        }
    }
}

impl fmt::Display for GlyphColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_tag())
    }
}

/// Identifies one reference glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    /// Digit 0-9
    pub digit: u8,
    /// Size hint
    pub size: DigitSize,
    /// Color scheme
    pub color: GlyphColor,
}

impl GlyphKey {
    /// Create a new key
    #[must_use]
    pub const fn new(digit: u8, size: DigitSize, color: GlyphColor) -> Self {
        Self { digit, size, color }
    }

    /// Every key the classifier needs: 10 digits x 2 sizes x 2 colors.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..10u8).flat_map(|digit| {
            DigitSize::ALL.into_iter().flat_map(move |size| {
                GlyphColor::ALL
                    .into_iter()
                    .map(move |color| Self::new(digit, size, color))
            })
        })
    }
}

impl fmt::Display for GlyphKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.digit, self.size, self.color)
    }
}

/// Resolves glyph keys to raw, unscaled images.
pub trait AssetStore: Send + Sync {
    /// Load the raw image for `key`.
    fn load(&self, key: &GlyphKey) -> SyncResult<DynamicImage>;
}

/// Reads `{digit}_time_{black|white}.png` from a directory.
///
/// One file serves both sizes; the glyph table scales it per size.
#[derive(Debug, Clone)]
pub struct DirectoryAssetStore {
    root: PathBuf,
}

impl DirectoryAssetStore {
    /// Create a store rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Asset directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that backs `key`
    #[must_use]
    pub fn path_for(&self, key: &GlyphKey) -> PathBuf {
        self.root
            .join(format!("{}_time_{}.png", key.digit, key.color.file_tag()))
    }
}

impl AssetStore for DirectoryAssetStore {
    fn load(&self, key: &GlyphKey) -> SyncResult<DynamicImage> {
        let path = self.path_for(key);
        if !path.exists() {
            return Err(SyncError::AssetNotFound {
                key: format!("{key} ({})", path.display()),
            });
        }
        Ok(image::open(&path)?)
    }
}

/// In-memory asset store.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetStore {
    images: HashMap<GlyphKey, DynamicImage>,
}

impl MemoryAssetStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image for one key
    pub fn insert(&mut self, key: GlyphKey, image: DynamicImage) {
        self.images.insert(key, image);
    }

    /// Register the same image for both sizes of a digit and color
    pub fn insert_all_sizes(&mut self, digit: u8, color: GlyphColor, image: &DynamicImage) {
        for size in DigitSize::ALL {
            self.images
                .insert(GlyphKey::new(digit, size, color), image.clone());
        }
    }

    /// Number of registered keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl AssetStore for MemoryAssetStore {
    fn load(&self, key: &GlyphKey) -> SyncResult<DynamicImage> {
        self.images
            .get(key)
            .cloned()
            .ok_or_else(|| SyncError::AssetNotFound {
                key: key.to_string(),
            })
    }
}
