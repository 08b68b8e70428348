//! Result and error types for framesync.

use thiserror::Error;

/// Result type for framesync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in framesync
#[derive(Debug, Error)]
pub enum SyncError {
    /// A frame's timer could not be classified with enough confidence
    #[error("Unreadable frame: {message}")]
    UnreadableFrame {
        /// Error message
        message: String,
    },

    /// Malformed or out-of-range timestamp string
    #[error("Invalid timestamp {value:?}: {message}")]
    InvalidTimestamp {
        /// The rejected input
        value: String,
        /// Error message
        message: String,
    },

    /// The frame source ended before the canonical sequence did
    #[error("Frame stream exhausted after {frames} frames")]
    StreamExhausted {
        /// Frames consumed before the stream ended
        frames: u64,
    },

    /// Inconsistent capture profile or tuning values
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// The asset store has no image for a glyph key
    #[error("Glyph asset not found: {key}")]
    AssetNotFound {
        /// Display form of the missing key
        key: String,
    },

    /// ffmpeg or ffprobe failed
    #[error("ffmpeg error: {message}")]
    Ffmpeg {
        /// Error message
        message: String,
    },

    /// Image decoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid timestamp error
    #[must_use]
    pub fn invalid_timestamp(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create an ffmpeg error
    #[must_use]
    pub fn ffmpeg(message: impl Into<String>) -> Self {
        Self::Ffmpeg {
            message: message.into(),
        }
    }

    /// Whether this error ends a synchronization run
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::UnreadableFrame { .. } | Self::InvalidTimestamp { .. }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error() {
        let err = SyncError::configuration("regions overflow frame");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("regions overflow frame"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_invalid_timestamp_error() {
        let err = SyncError::invalid_timestamp("12ab56", "not numeric");
        assert!(err.to_string().contains("\"12ab56\""));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_stream_exhausted_error() {
        let err = SyncError::StreamExhausted { frames: 42 };
        assert_eq!(err.to_string(), "Frame stream exhausted after 42 frames");
        assert!(err.is_fatal());
    }

    #[test]
    fn test_unreadable_is_not_fatal() {
        let err = SyncError::UnreadableFrame {
            message: "digit 3".to_string(),
        };
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SyncError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }
}
