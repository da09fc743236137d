//! Text classification for sponsored-content disclosure.
//!
//! Three layers, composed left to right:
//!
//! - [`lexicon`]: the sponsor / self-paid / negation vocabularies.
//! - [`score`]: negation-aware keyword scanning over normalized text,
//!   parameterized by a [`ScorePolicy`] magnitude table.
//! - [`decision`]: threshold rules turning scores (and, for fusion, the best
//!   perceptual banner match) into a final [`Label`].
//!
//! The crate is pure: no IO, no async. Callers fetch and extract text
//! elsewhere and hand plain strings in.

pub mod decision;
pub mod lexicon;
pub mod score;

pub use decision::{decide_text, fuse, BannerSignal, Decision, Label, EVIDENCE_LIMIT, FUSION_DISTANCE};
pub use lexicon::Lexicon;
pub use score::{score, Deltas, Evidence, KeywordKind, ScorePolicy, TextScore};
