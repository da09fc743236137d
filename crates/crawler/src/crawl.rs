//! The blog crawl: feed-driven when the platform has one, link-scan fallback
//! otherwise.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{info, warn};
use url::Url;

use crate::client::PageClient;
use crate::error::CrawlError;
use crate::extract::{extract_post, frame_src};
use crate::feed::{parse_entries, FeedEntry};
use crate::platform::Platform;
use crate::types::Post;

/// Anchors whose path carries a year/month segment, the common archive shape.
static DATE_PATH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}/\d{2}/").unwrap());

/// Anchors that look like individual posts.
static POST_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(post|entry|article|\d{6,})").unwrap());

/// Crawl the most recent posts of a blog.
///
/// Platforms with a derivable feed go through it; feed failure or an unknown
/// platform falls back to scanning the home page for post-looking links. A
/// single post failing to fetch skips that post only.
pub async fn fetch_posts(client: &PageClient, blog_url: &str) -> Result<Vec<Post>, CrawlError> {
    let platform = Platform::detect(blog_url)?;

    if let Some(feed_url) = platform.feed_url() {
        match crawl_feed(client, &feed_url).await {
            Ok(posts) => return Ok(posts),
            Err(err) => {
                warn!(feed = %feed_url, error = %err, "feed crawl failed, trying link scan");
            }
        }
    }

    crawl_generic(client, blog_url).await
}

async fn crawl_feed(client: &PageClient, feed_url: &str) -> Result<Vec<Post>, CrawlError> {
    let body = client.fetch_bytes(feed_url).await?;
    let entries = parse_entries(&body, client.config().max_feed_entries)?;
    info!(feed = %feed_url, entries = entries.len(), "feed fetched");

    let mut posts = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(client.config().post_delay).await;
        }
        if let Some(post) = fill_post(client, entry).await {
            posts.push(post);
        }
    }
    Ok(posts)
}

/// Fetch the post page behind a feed entry. A fetch failure drops the post
/// from the crawl rather than surfacing a degraded entry.
async fn fill_post(client: &PageClient, entry: FeedEntry) -> Option<Post> {
    let html = match fetch_post_html(client, &entry.link).await {
        Ok(html) => html,
        Err(err) => {
            warn!(link = %entry.link, error = %err, "post fetch failed, skipping");
            return None;
        }
    };

    let extracted = extract_post(&html);
    Some(Post {
        title: entry.title,
        link: entry.link,
        pub_date: entry.pub_date,
        summary: entry.summary,
        content: extracted.content,
        tags: extracted.tags,
        alt_texts: extracted.alt_texts,
    })
}

/// Fetch a post page, following the platform content frame if present.
async fn fetch_post_html(client: &PageClient, link: &str) -> Result<String, CrawlError> {
    let html = client.fetch_text(link).await?;
    if let Some(src) = frame_src(&html) {
        if let Ok(base) = Url::parse(link) {
            if let Ok(frame_url) = base.join(src.trim()) {
                return client.fetch_text(frame_url.as_str()).await;
            }
        }
    }
    Ok(html)
}

async fn crawl_generic(client: &PageClient, blog_url: &str) -> Result<Vec<Post>, CrawlError> {
    let html = client.fetch_text(blog_url).await?;
    let links = collect_post_links(&html, blog_url, client.config().max_generic_links);
    info!(blog = %blog_url, links = links.len(), "link scan");

    let mut posts = Vec::with_capacity(links.len());
    for (i, (title, link)) in links.into_iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(client.config().post_delay).await;
        }
        let entry = FeedEntry {
            title,
            link,
            ..FeedEntry::default()
        };
        if let Some(post) = fill_post(client, entry).await {
            posts.push(post);
        }
    }
    Ok(posts)
}

/// Post-looking anchors of a home page: absolutized, same-host,
/// de-duplicated, capped.
pub(crate) fn collect_post_links(html: &str, base_url: &str, cap: usize) -> Vec<(String, String)> {
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };
    let doc = Html::parse_document(html);
    let anchor_sel = Selector::parse("a[href]").expect("static selector");

    let mut links: Vec<(String, String)> = Vec::new();
    for anchor in doc.select(&anchor_sel) {
        if links.len() >= cap {
            break;
        }
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !DATE_PATH_RE.is_match(href) && !POST_PATH_RE.is_match(href) {
            continue;
        }
        let Ok(absolute) = base.join(href) else {
            continue;
        };
        if absolute.host_str() != base.host_str() {
            continue;
        }
        let url = absolute.to_string();
        if url == base_url || links.iter().any(|(_, existing)| existing == &url) {
            continue;
        }
        let title: String = anchor.text().collect::<Vec<_>>().join(" ");
        links.push((title.trim().to_string(), url));
    }
    links
}
