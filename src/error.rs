//! Error types for image-compare operations.

use thiserror::Error;

/// Result type alias for image-compare operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, comparing or exporting images.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A payload could not be decoded as a supported raster format.
    #[error("Decode failed: {name}: {reason}")]
    Decode {
        /// Display name of the payload that failed to decode.
        name: String,
        /// Reason reported by the decoder.
        reason: String,
    },

    /// Sensitivity outside the accepted 1-150 range.
    #[error("Invalid sensitivity: {0} (expected 1-150)")]
    InvalidSensitivity(u32),

    /// Max-diff filter outside the accepted 0-100 range.
    #[error("Invalid max diff: {0}% (expected 0-100)")]
    InvalidMaxDiff(u32),

    /// Pixel buffer length does not match the declared dimensions.
    #[error("Invalid raster: {width}x{height} needs {} pixels, got {len}", .width * .height)]
    InvalidRaster {
        /// Declared width.
        width: usize,
        /// Declared height.
        height: usize,
        /// Number of pixels actually supplied.
        len: usize,
    },

    /// Failed to encode an export (diff PNG or CSV text).
    #[error("Encode failed: {0}")]
    Encode(String),

    /// Failed to list candidate images.
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Build a [`Error::Decode`] from anything displayable.
    pub(crate) fn decode(name: &str, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error came from decoding an input payload.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}
