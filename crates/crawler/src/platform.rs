//! Blog platform detection and feed URL derivation.

use url::Url;

use crate::error::CrawlError;

/// Known blog platforms with derivable feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    /// blog.naver.com/{blog_id}
    Naver { blog_id: String },
    /// {name}.tistory.com
    Tistory { host: String },
    /// Anything else; crawled via the generic link-scan fallback.
    Generic,
}

impl Platform {
    /// Classify a blog URL.
    pub fn detect(blog_url: &str) -> Result<Self, CrawlError> {
        let parsed = Url::parse(blog_url)
            .map_err(|e| CrawlError::invalid_url(blog_url, e.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| CrawlError::invalid_url(blog_url, "missing host"))?
            .to_lowercase();

        if host == "blog.naver.com" || host == "m.blog.naver.com" {
            let blog_id = parsed
                .path_segments()
                .and_then(|mut segments| segments.find(|s| !s.is_empty()))
                .map(str::to_string)
                .ok_or_else(|| CrawlError::invalid_url(blog_url, "missing naver blog id"))?;
            return Ok(Platform::Naver { blog_id });
        }

        if host.ends_with(".tistory.com") {
            return Ok(Platform::Tistory { host });
        }

        Ok(Platform::Generic)
    }

    /// Feed URL for platforms that have one.
    pub fn feed_url(&self) -> Option<String> {
        match self {
            Platform::Naver { blog_id } => {
                Some(format!("https://rss.blog.naver.com/{blog_id}.xml"))
            }
            Platform::Tistory { host } => Some(format!("https://{host}/rss")),
            Platform::Generic => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naver_blog_id_from_path() {
        let platform = Platform::detect("https://blog.naver.com/tasty_reviews/223001").unwrap();
        assert_eq!(
            platform,
            Platform::Naver {
                blog_id: "tasty_reviews".into()
            }
        );
        assert_eq!(
            platform.feed_url().unwrap(),
            "https://rss.blog.naver.com/tasty_reviews.xml"
        );
    }

    #[test]
    fn mobile_naver_host_detected() {
        let platform = Platform::detect("https://m.blog.naver.com/someone").unwrap();
        assert!(matches!(platform, Platform::Naver { .. }));
    }

    #[test]
    fn tistory_feed_is_host_rss() {
        let platform = Platform::detect("https://foodie.tistory.com/123").unwrap();
        assert_eq!(
            platform.feed_url().unwrap(),
            "https://foodie.tistory.com/rss"
        );
    }

    #[test]
    fn unknown_host_is_generic() {
        let platform = Platform::detect("https://example.com/blog").unwrap();
        assert_eq!(platform, Platform::Generic);
        assert!(platform.feed_url().is_none());
    }

    #[test]
    fn naver_root_without_blog_id_rejected() {
        assert!(Platform::detect("https://blog.naver.com/").is_err());
    }

    #[test]
    fn garbage_rejected() {
        assert!(Platform::detect("not a url").is_err());
    }
}
