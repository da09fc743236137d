//! Sponsor / self-paid keyword lexicons.
//!
//! Lexicons are explicit values passed into the scorer at construction time,
//! never ambient globals, so scorers stay testable in isolation and a
//! per-locale vocabulary can be swapped in without touching scan logic.

use serde::{Deserialize, Serialize};

/// The three keyword lists consulted by the scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lexicon {
    /// Phrases that signal a paid or sponsored post.
    pub sponsored: Vec<String>,
    /// Phrases that signal an explicitly self-paid experience.
    pub self_paid: Vec<String>,
    /// Negation phrases that flip the polarity of a nearby keyword hit
    /// ("not sponsored", "협찬 아님").
    pub negations: Vec<String>,
}

impl Lexicon {
    /// The Korean blog vocabulary the system ships with, plus the English
    /// disclosure terms that show up on the same platforms.
    pub fn korean_defaults() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            sponsored: owned(&[
                // 업체 제공/대가성 표기
                "협찬",
                "제공받",
                "제공 받",
                "원고료",
                "체험단",
                "서포터즈",
                "유료광고",
                "광고 포함",
                "업체로부터",
                "소정의 수수료",
                "파트너스 활동",
                "sponsored",
                "paid partnership",
            ]),
            self_paid: owned(&[
                "내돈내산",
                "내 돈 내 산",
                "내 돈 주고",
                "직접 구매",
                "직접 구입",
                "직접 결제",
                "자비로",
                "사비로",
                "self-paid",
            ]),
            negations: owned(&[
                "아님", "아닙", "아니고", "아니에요", "아니예요", "없이", "없는", "않", "no ",
                "not ",
            ]),
        }
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::korean_defaults()
    }
}
