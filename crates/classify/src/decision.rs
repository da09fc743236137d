//! Decision rules: standalone text thresholds and banner/text fusion.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::score::{Evidence, TextScore};

/// Final classification label. Total: every input combination maps to
/// exactly one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// Paid or sponsored promotion.
    Sponsored,
    /// Explicitly self-paid experience.
    #[serde(rename = "self")]
    SelfPaid,
    /// No explicit signal either way.
    None,
    /// Text-only classification could not decide.
    Unknown,
}

/// Fused output of the detection pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub label: Label,
    /// Populated only by the standalone text decision; fusion reports labels
    /// without a confidence figure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Name of the matched banner signature, when a banner decided the label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Hamming distance of the winning banner match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<u32>,
    /// Bounded evidence trail carried over from the text scorer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<Evidence>,
}

impl Decision {
    fn bare(label: Label) -> Self {
        Self {
            label,
            confidence: None,
            source: None,
            distance: None,
            evidence: Vec::new(),
        }
    }
}

/// Maximum evidence entries carried into a decision.
pub const EVIDENCE_LIMIT: usize = 8;

/// Standalone decision over a basic-mode [`TextScore`].
///
/// Thresholds: a sponsor lead of 2 or more decides `sponsored` with
/// confidence `min(0.9, 0.6 + 0.1·lead)`; otherwise any positive self-paid
/// score decides `self` with confidence `min(0.95, 0.6 + 0.1·(self−1))`;
/// otherwise `unknown` at 0.5.
pub fn decide_text(score: &TextScore) -> Decision {
    let lead = score.sponsored - score.self_paid;
    let mut evidence = score.evidence.clone();
    evidence.truncate(EVIDENCE_LIMIT);

    let (label, confidence) = if lead >= 2 {
        (
            Label::Sponsored,
            (0.6 + 0.1 * f64::from(lead)).min(0.9),
        )
    } else if score.self_paid >= 1 {
        (
            Label::SelfPaid,
            (0.6 + 0.1 * f64::from(score.self_paid - 1)).min(0.95),
        )
    } else {
        (Label::Unknown, 0.5)
    };

    Decision {
        label,
        confidence: Some(confidence),
        source: None,
        distance: None,
        evidence,
    }
}

/// The banner-side input to fusion: the winning match reduced to the facts
/// the precedence rules consult.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerSignal {
    /// Name of the closest signature.
    pub source: String,
    /// Minimum Hamming distance across all signatures tried.
    pub distance: u32,
    /// Whether the distance cleared the matcher's threshold.
    pub matched: bool,
    /// Whether the image passed the banner-shape heuristic.
    pub banner_shaped: bool,
}

/// Default fusion distance ceiling: stricter than the batch matcher default
/// because a banner alone decides the label here.
pub const FUSION_DISTANCE: u32 = 6;

/// Fuse a weighted-mode text score with the best banner match.
///
/// Evaluated in strict precedence order:
///
/// 1. Explicit self-funding language is authoritative and overrides any
///    banner signal.
/// 2. A strong sponsor lead in the text decides `sponsored`.
/// 3. Only when text is inconclusive is the perceptual signal consulted, and
///    then only for shape-plausible banners within `max_distance`.
/// 4. Anything else is `none`.
pub fn fuse(text: &TextScore, banner: Option<&BannerSignal>, max_distance: u32) -> Decision {
    let decision = if text.has_explicit_self_paid || text.self_paid >= text.sponsored + 2 {
        Decision::bare(Label::SelfPaid)
    } else if text.sponsored >= text.self_paid + 2 {
        Decision::bare(Label::Sponsored)
    } else if let Some(banner) = banner.filter(|b| {
        b.matched && b.banner_shaped && b.distance <= max_distance
    }) {
        Decision {
            label: Label::Sponsored,
            confidence: None,
            source: Some(banner.source.clone()),
            distance: Some(banner.distance),
            evidence: Vec::new(),
        }
    } else {
        Decision::bare(Label::None)
    };

    debug!(
        label = ?decision.label,
        sponsored = text.sponsored,
        self_paid = text.self_paid,
        banner = banner.is_some(),
        "decision_fused"
    );
    decision
}
