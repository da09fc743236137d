//! Feed parsing.

use feed_rs::parser;

use crate::error::CrawlError;

/// The feed-level fields of one entry, before the post page is fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub pub_date: Option<String>,
    pub summary: String,
}

/// Parse a feed body into entries, keeping at most `limit`.
pub fn parse_entries(body: &[u8], limit: usize) -> Result<Vec<FeedEntry>, CrawlError> {
    let feed = parser::parse(body)?;
    let entries = feed
        .entries
        .into_iter()
        .take(limit)
        .filter_map(|entry| {
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .or_else(|| Some(entry.id.clone()).filter(|id| id.starts_with("http")))?;
            Some(FeedEntry {
                title: entry.title.map(|t| t.content).unwrap_or_default(),
                link,
                pub_date: entry
                    .published
                    .or(entry.updated)
                    .map(|d| d.to_rfc3339()),
                summary: entry.summary.map(|s| s.content).unwrap_or_default(),
            })
        })
        .collect();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>맛집 블로그</title>
    <item>
      <title>협찬 받은 후기</title>
      <link>https://blog.example/1</link>
      <pubDate>Mon, 06 Jan 2025 10:00:00 +0900</pubDate>
      <description>첫 번째 글</description>
    </item>
    <item>
      <title>내돈내산 후기</title>
      <link>https://blog.example/2</link>
    </item>
    <item>
      <title>셋째 글</title>
      <link>https://blog.example/3</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_rss_items_in_order() {
        let entries = parse_entries(RSS.as_bytes(), 20).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].title, "협찬 받은 후기");
        assert_eq!(entries[0].link, "https://blog.example/1");
        assert!(entries[0].pub_date.is_some());
        assert_eq!(entries[0].summary, "첫 번째 글");
        assert!(entries[1].pub_date.is_none());
    }

    #[test]
    fn limit_truncates_entries() {
        let entries = parse_entries(RSS.as_bytes(), 2).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(parse_entries(b"this is not xml", 20).is_err());
    }
}
