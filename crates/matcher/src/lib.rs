//! # Banner matcher
//!
//! Compares candidate images against the stored sponsor-banner signatures by
//! average-hash distance. Three entry points:
//!
//! - [`BannerMatcher::compare_buffer`] — distance one decoded buffer against
//!   every signature.
//! - [`BannerMatcher::match_buffer`] — the upload path, strict threshold.
//! - [`BannerMatcher::match_image_urls`] — fetch a batch of candidate URLs
//!   with bounded concurrency and pick the global winner.
//!
//! The matcher never mutates the signature store; it holds an `Arc` snapshot
//! taken at startup.

pub mod candidate;
mod engine;
mod types;

pub use candidate::{is_banner_candidate, is_denylisted_url, URL_DENYLIST};
pub use engine::{BannerMatcher, MatcherConfig};
pub use types::{BannerMatch, BatchMatch, ImageOutcome, MatchError, SignatureHit};
