use thiserror::Error;

/// Errors surfaced by the crawl layer.
///
/// Per-post failures inside a crawl are logged and skipped; these variants
/// cover failures of the operation as a whole.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Network failure, timeout, or non-2xx status.
    #[error("fetch error: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The feed body could not be parsed.
    #[error("feed parse error: {0}")]
    Feed(#[from] feed_rs::parser::ParseFeedError),

    /// The target URL is not something we can crawl.
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl CrawlError {
    pub(crate) fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }
}
