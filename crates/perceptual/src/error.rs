//! Error types for the perceptual hashing layer.

use thiserror::Error;

/// Errors produced while computing an average-hash fingerprint.
#[derive(Debug, Error)]
pub enum PerceptualError {
    /// The supplied bytes could not be decoded as an image.
    #[error("failed to decode image bytes: {0}")]
    Decode(#[from] image::ImageError),

    /// The resolved crop rectangle has zero area.
    ///
    /// This happens when an explicit `Rect` region lies entirely outside the
    /// image bounds, or when a half-split is requested on a degenerate
    /// (1-pixel-wide or 1-pixel-tall) image.
    #[error("region resolves to an empty rectangle on a {width}x{height} image")]
    EmptyRegion { width: u32, height: u32 },

    /// A region string could not be parsed.
    #[error("invalid region {0:?}: expected whole|left|right|top|bottom|x,y,w,h")]
    InvalidRegion(String),

    /// A stored fingerprint is not 16 hex characters.
    #[error("invalid fingerprint hex {0:?}: expected exactly 16 hex characters")]
    InvalidHex(String),
}
