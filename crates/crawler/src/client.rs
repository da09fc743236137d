use std::time::Duration;

use crate::error::CrawlError;

/// Crawl tuning knobs.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Pause between consecutive post fetches. Blog hosts rate-limit
    /// aggressively; the crawl stays deliberately sequential and slow.
    pub post_delay: Duration,
    /// How many feed entries to crawl per blog.
    pub max_feed_entries: usize,
    /// How many links the generic (no-feed) fallback may follow.
    pub max_generic_links: usize,
    /// Cap on harvested image candidates per page.
    pub max_image_candidates: usize,
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            post_delay: Duration::from_millis(800),
            max_feed_entries: 20,
            max_generic_links: 15,
            max_image_candidates: 80,
            user_agent: "Mozilla/5.0 (compatible; sponsorscope/0.1)".to_string(),
        }
    }
}

/// HTTP client wrapper for page and feed fetches.
#[derive(Debug, Clone)]
pub struct PageClient {
    client: reqwest::Client,
    config: CrawlerConfig,
}

impl PageClient {
    pub fn new(config: CrawlerConfig) -> Result<Self, CrawlError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Fetch a page body as text. Non-2xx statuses are errors.
    pub async fn fetch_text(&self, url: &str) -> Result<String, CrawlError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::REFERER, safe_referer(url))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    /// Fetch raw bytes, used for feed bodies.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, CrawlError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Origin of `url`, used as a Referer so host-protected blog assets resolve.
pub fn safe_referer(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => format!(
            "{}://{}/",
            parsed.scheme(),
            parsed.host_str().unwrap_or_default()
        ),
        Err(_) => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referer_is_the_origin() {
        assert_eq!(
            safe_referer("https://blog.naver.com/foo/223344?x=1"),
            "https://blog.naver.com/"
        );
    }

    #[test]
    fn unparsable_url_passes_through() {
        assert_eq!(safe_referer("not a url"), "not a url");
    }
}
