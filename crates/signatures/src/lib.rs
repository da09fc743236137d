//! # Sponsor-banner signature store
//!
//! A [`SignatureStore`] is the persisted collection of known sponsor-banner
//! fingerprints. The file format is a flat JSON array of records:
//!
//! ```json
//! [
//!   { "name": "naver-coop", "region": "top", "avgHash": "ffd8a01000f0ff3c" }
//! ]
//! ```
//!
//! Ownership model: the store is populated offline by the `make-signature`
//! operator tool and loaded **once** per process at matcher start. The
//! detection request path never mutates it, so a loaded store can be shared
//! behind an `Arc` and read concurrently without locking.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use perceptual::Region;

/// Errors produced while loading or persisting the signature file.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// The signature file could not be read or written.
    #[error("signature file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The signature file is not valid JSON, or a record is malformed.
    #[error("signature file parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A stored fingerprint is not a valid 64-bit hex string.
    #[error("signature {name:?} carries an invalid fingerprint: {source}")]
    InvalidFingerprint {
        name: String,
        source: perceptual::PerceptualError,
    },
}

/// One known sponsor-banner fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    /// Platform label, e.g. the campaign network the banner belongs to.
    pub name: String,
    /// Region of the candidate image that was hashed when this signature was
    /// created. The matcher must hash candidates with the same region.
    #[serde(default)]
    pub region: Region,
    /// 64-bit average hash, 16 lowercase hex chars.
    #[serde(rename = "avgHash")]
    pub avg_hash: String,
    /// Free-form operator note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Signature {
    /// Build a signature from a raw fingerprint.
    pub fn new(name: impl Into<String>, region: Region, hash: u64) -> Self {
        Self {
            name: name.into(),
            region,
            avg_hash: perceptual::to_hex(hash),
            note: None,
        }
    }

    /// The fingerprint as a native `u64`.
    pub fn hash_bits(&self) -> Result<u64, perceptual::PerceptualError> {
        perceptual::from_hex(&self.avg_hash)
    }
}

/// An in-memory snapshot of the signature file.
///
/// Every fingerprint is validated at load time so the match path can treat
/// `hash_bits()` as infallible in practice.
#[derive(Debug, Clone, Default)]
pub struct SignatureStore {
    signatures: Vec<Signature>,
}

impl SignatureStore {
    /// Load the store from `path`. A missing file yields an empty store —
    /// that is the normal state of a fresh deployment, and endpoints that
    /// require signatures report it per request instead.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SignatureError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "signature file missing, starting with empty store");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)?;
        let signatures: Vec<Signature> = serde_json::from_str(&raw)?;
        for sig in &signatures {
            sig.hash_bits()
                .map_err(|source| SignatureError::InvalidFingerprint {
                    name: sig.name.clone(),
                    source,
                })?;
        }

        info!(path = %path.display(), count = signatures.len(), "signature store loaded");
        Ok(Self { signatures })
    }

    /// Build a store directly from records (tests, in-memory matching).
    pub fn from_signatures(signatures: Vec<Signature>) -> Self {
        Self { signatures }
    }

    /// Persist the store back to `path` as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SignatureError> {
        let json = serde_json::to_string_pretty(&self.signatures)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Append a signature. Only the offline authoring tool calls this; the
    /// request path holds the store behind an immutable snapshot.
    pub fn push(&mut self, signature: Signature) {
        self.signatures.push(signature);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signature> {
        self.signatures.iter()
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}
