use serde::{Deserialize, Serialize};
use thiserror::Error;

use perceptual::Region;

/// Distance of one candidate buffer against one stored signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureHit {
    /// Name of the signature compared against.
    pub name: String,
    /// Region the comparison was hashed with.
    pub region: Region,
    /// Hamming distance, 0..=64.
    pub distance: u32,
    /// Whether the distance cleared the threshold in effect.
    pub matched: bool,
}

/// The per-image best result of a URL batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerMatch {
    /// Image URL the match was computed for.
    pub url: String,
    /// Name of the closest signature.
    pub source: String,
    /// Hamming distance of the closest signature.
    pub distance: u32,
    pub matched: bool,
    /// Whether the image passed the banner-shape heuristic. Shape failures
    /// stay in the diagnostics rather than being dropped, so callers can see
    /// why a close match did not decide anything.
    pub banner_shaped: bool,
}

/// Diagnostics for one URL in a batch. Exactly one of `best` and `error` is
/// populated; a fetched image that matched no signature still carries `best`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageOutcome {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best: Option<BannerMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Batch result: the global winner plus per-image diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchMatch {
    /// Minimum-distance match among all images that cleared the threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<BannerMatch>,
    pub details: Vec<ImageOutcome>,
}

/// Errors produced by the matching layer.
#[derive(Debug, Error)]
pub enum MatchError {
    /// No signatures are loaded; nothing to compare against.
    #[error("signature store is empty")]
    NoSignatures,

    /// The HTTP client could not be constructed.
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),

    /// The candidate buffer could not be hashed with any signature region.
    #[error("perceptual error: {0}")]
    Perceptual(#[from] perceptual::PerceptualError),
}
