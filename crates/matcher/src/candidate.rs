//! Banner-shape heuristic.
//!
//! Blog pages are full of images that can never be a sponsorship banner:
//! avatars, emoticons, navigation sprites, post photos. The heuristic prunes
//! them on dimensions and URL shape before any hashing happens, and the same
//! predicate later gates whether a close perceptual match is allowed to
//! decide a label on its own.

/// URL substrings that mark an image as UI chrome rather than banner content.
pub const URL_DENYLIST: &[&str] = &[
    "btn_",
    "button",
    "sprite",
    "icon",
    "favicon",
    "download",
    "spblog",
    "emoticon",
    "logo",
    "menu",
    "arrow",
    "banner_small",
    "mylog/post/btn",
    "download2",
];

/// Minimum plausible banner area, 120x40 px. The gate is on area, not on
/// each dimension, so a slightly narrower but taller strip still qualifies.
const MIN_AREA: u64 = 120 * 40;

/// Aspect-ratio band, exclusive on both ends. Sponsorship banners are wide
/// strips; squares and extreme ribbons both fall outside.
const MIN_RATIO: f64 = 2.5;
const MAX_RATIO: f64 = 8.0;

/// True when `url` contains any denylist substring or is an animated gif.
pub fn is_denylisted_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    if lower.ends_with(".gif") {
        return true;
    }
    URL_DENYLIST.iter().any(|needle| lower.contains(needle))
}

/// Full banner-shape predicate over a candidate's URL and pixel dimensions.
pub fn is_banner_candidate(url: &str, width: u32, height: u32) -> bool {
    if height == 0 || u64::from(width) * u64::from(height) < MIN_AREA {
        return false;
    }
    let ratio = f64::from(width) / f64::from(height);
    if ratio <= MIN_RATIO || ratio >= MAX_RATIO {
        return false;
    }
    !is_denylisted_url(url)
}
