//! Timer digit recognition.
//!
//! ```text
//! AssetStore ──load──► GlyphTable (built once, shared) ──► DigitClassifier
//!                                                              │
//!                               frame + DigitRegion ───────────┘──► Option<u8>
//! ```

pub mod assets;
pub mod classifier;
pub mod glyphs;

pub use assets::{AssetStore, DigitSize, DirectoryAssetStore, GlyphColor, GlyphKey, MemoryAssetStore};
pub use classifier::{ClassifierConfig, DigitClassifier, DigitScore, DEFAULT_MIN_CONFIDENCE};
pub use glyphs::{prepare_glyph, GlyphScale, GlyphTable};
