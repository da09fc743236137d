//! Negation-aware keyword scoring.
//!
//! The scorer scans normalized text for every lexicon keyword with a plain
//! forward string search. Each occurrence inspects a symmetric 15-character
//! window (extended by the keyword itself) for a negation phrase; a negation
//! changes which deltas the occurrence contributes.
//!
//! Two scoring formulas exist historically — a ±1 "basic" formula used for
//! whole-post classification and a ±2/±3 "weighted" formula used by live
//! on-page detection. Both are preserved as named [`ScorePolicy`]
//! constructors over one magnitude table rather than as separate scan
//! implementations.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lexicon::Lexicon;

/// Characters inspected on each side of a keyword hit for negation phrases.
const NEGATION_WINDOW: usize = 15;

/// Which lexicon a keyword hit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordKind {
    Sponsored,
    SelfPaid,
}

/// Signed contribution of one occurrence to the two score scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deltas {
    pub sponsored: i32,
    pub self_paid: i32,
}

/// Magnitude table for one scoring formula.
///
/// Four rows cover the full occurrence space: {sponsor, self-paid} keyword x
/// {plain, negated}. Encoding both historical formulas as tables keeps the
/// scan loop free of per-policy special cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePolicy {
    pub sponsor_hit: Deltas,
    pub sponsor_negated: Deltas,
    pub self_hit: Deltas,
    pub self_negated: Deltas,
}

impl ScorePolicy {
    /// The whole-post classification formula: every occurrence contributes a
    /// magnitude of 1, and negation flips the contribution to the *opposite*
    /// scale ("협찬 아님" counts as self-paid evidence).
    pub fn basic() -> Self {
        Self {
            sponsor_hit: Deltas {
                sponsored: 1,
                self_paid: 0,
            },
            sponsor_negated: Deltas {
                sponsored: 0,
                self_paid: 1,
            },
            self_hit: Deltas {
                sponsored: 0,
                self_paid: 1,
            },
            self_negated: Deltas {
                sponsored: 1,
                self_paid: 0,
            },
        }
    }

    /// The live on-page detection formula: sponsor hits weigh ±2, self-paid
    /// hits +3 plain and −1 negated. Negation stays on the keyword's own
    /// scale here, matching the tuning of the original detection path.
    pub fn weighted() -> Self {
        Self {
            sponsor_hit: Deltas {
                sponsored: 2,
                self_paid: 0,
            },
            sponsor_negated: Deltas {
                sponsored: -2,
                self_paid: 0,
            },
            self_hit: Deltas {
                sponsored: 0,
                self_paid: 3,
            },
            self_negated: Deltas {
                sponsored: 0,
                self_paid: -1,
            },
        }
    }
}

/// One keyword occurrence, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub keyword: String,
    pub kind: KeywordKind,
    /// Byte offset of the hit within the normalized text.
    pub position: usize,
    /// Whether a negation phrase was found in the surrounding window.
    pub negated: bool,
    pub delta: Deltas,
}

/// Scorer output: two signed scores plus the evidence trail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextScore {
    pub sponsored: i32,
    pub self_paid: i32,
    /// True when any *non-negated* self-paid keyword was found. Used as a
    /// fast-path override by decision fusion.
    pub has_explicit_self_paid: bool,
    pub evidence: Vec<Evidence>,
}

/// Collapse control whitespace to single spaces and lowercase.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(segment);
    }
    out.to_lowercase()
}

/// Score `text` against `lexicon` using `policy`.
pub fn score(text: &str, lexicon: &Lexicon, policy: &ScorePolicy) -> TextScore {
    let normalized = normalize(text);
    let mut result = TextScore::default();

    scan(
        &normalized,
        &lexicon.sponsored,
        KeywordKind::Sponsored,
        lexicon,
        policy,
        &mut result,
    );
    scan(
        &normalized,
        &lexicon.self_paid,
        KeywordKind::SelfPaid,
        lexicon,
        policy,
        &mut result,
    );

    debug!(
        sponsored = result.sponsored,
        self_paid = result.self_paid,
        hits = result.evidence.len(),
        "text_scored"
    );
    result
}

fn scan(
    text: &str,
    keywords: &[String],
    kind: KeywordKind,
    lexicon: &Lexicon,
    policy: &ScorePolicy,
    result: &mut TextScore,
) {
    for raw_keyword in keywords {
        let keyword = raw_keyword.to_lowercase();
        if keyword.is_empty() {
            continue;
        }
        for (position, _) in text.match_indices(&keyword) {
            let negated = has_negation_around(text, position, keyword.len(), lexicon);
            let delta = match (kind, negated) {
                (KeywordKind::Sponsored, false) => policy.sponsor_hit,
                (KeywordKind::Sponsored, true) => policy.sponsor_negated,
                (KeywordKind::SelfPaid, false) => policy.self_hit,
                (KeywordKind::SelfPaid, true) => policy.self_negated,
            };

            result.sponsored += delta.sponsored;
            result.self_paid += delta.self_paid;
            if kind == KeywordKind::SelfPaid && !negated {
                result.has_explicit_self_paid = true;
            }
            result.evidence.push(Evidence {
                keyword: raw_keyword.clone(),
                kind,
                position,
                negated,
                delta,
            });
        }
    }
}

/// Check a ±15-character window (extended by the keyword) for any negation
/// phrase.
fn has_negation_around(text: &str, start: usize, keyword_len: usize, lexicon: &Lexicon) -> bool {
    let window_start = step_back(text, start, NEGATION_WINDOW);
    let window_end = step_forward(text, (start + keyword_len).min(text.len()), NEGATION_WINDOW);
    let slice = &text[window_start..window_end];
    lexicon
        .negations
        .iter()
        .any(|neg| slice.contains(&neg.to_lowercase()))
}

/// Move `n` characters backwards from byte offset `idx`, staying on char
/// boundaries.
fn step_back(text: &str, idx: usize, n: usize) -> usize {
    let mut i = idx.min(text.len());
    for _ in 0..n {
        if i == 0 {
            return 0;
        }
        i -= 1;
        while i > 0 && !text.is_char_boundary(i) {
            i -= 1;
        }
    }
    i
}

/// Move `n` characters forwards from byte offset `idx`, staying on char
/// boundaries.
fn step_forward(text: &str, idx: usize, n: usize) -> usize {
    let mut i = idx.min(text.len());
    for _ in 0..n {
        if i >= text.len() {
            return text.len();
        }
        i += 1;
        while i < text.len() && !text.is_char_boundary(i) {
            i += 1;
        }
    }
    i
}
