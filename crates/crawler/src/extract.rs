//! HTML extraction: post text, tags, alt texts, and image candidates.
//!
//! Parsing happens in synchronous helpers over owned HTML strings so no
//! parsed document is ever held across an await point.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::client::PageClient;
use crate::error::CrawlError;
use crate::types::PageExtract;

/// Content-area selectors tried in order; the first that matches wins.
const CONTENT_SELECTORS: &str = "article, .se-main-container, #content, .post, .entry";

/// UI chrome the image harvest drops outright. Broader than the matcher's
/// shape denylist since harvesting sees raw page markup, profile widgets and
/// all.
const HARVEST_DENYLIST: &[&str] = &[
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
    "profile",
    "blank.",
];

static EXTENSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(png|jpe?g|webp|bmp)([?#]|$)").unwrap());

static BACKGROUND_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"background-image\s*:\s*url\(\s*['"]?([^'")\s]+)"#).unwrap());

/// Hosts and query shapes that serve images without an extension in the path.
const DYNAMIC_IMAGE_HINTS: &[&str] = &["pstatic.net", "blogfiles", "type=w"];

/// Textual content of a post page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostContent {
    pub content: String,
    pub tags: Vec<String>,
    pub alt_texts: Vec<String>,
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

fn squash(text: impl Iterator<Item = impl AsRef<str>>) -> String {
    let mut out = String::new();
    for chunk in text {
        for word in chunk.as_ref().split_whitespace() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(word);
        }
    }
    out
}

/// Extract the content text, `#`-tags, and image alt texts of a post page.
pub fn extract_post(html: &str) -> PostContent {
    let doc = Html::parse_document(html);

    let content_sel = selector(CONTENT_SELECTORS);
    let body_sel = selector("body");
    let content = match doc.select(&content_sel).next() {
        Some(node) => squash(node.text()),
        None => doc
            .select(&body_sel)
            .next()
            .map(|node| squash(node.text()))
            .unwrap_or_default(),
    };

    let img_sel = selector("img[alt]");
    let alt_texts: Vec<String> = doc
        .select(&img_sel)
        .filter_map(|img| img.value().attr("alt"))
        .map(|alt| alt.trim().to_string())
        .filter(|alt| !alt.is_empty())
        .collect();

    let tag_sel = selector("a, span");
    let mut tags: Vec<String> = Vec::new();
    for node in doc.select(&tag_sel) {
        let text = squash(node.text());
        if text.starts_with('#') && text.len() > 1 && !tags.contains(&text) {
            tags.push(text);
        }
    }

    PostContent {
        content,
        tags,
        alt_texts,
    }
}

/// Absolutize `raw` against the page URL, dropping anchors and data URIs.
fn absolutize(raw: &str, base: &Url) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with("data:") || trimmed.starts_with('#') {
        return None;
    }
    base.join(trimmed).ok().map(|u| u.to_string())
}

fn looks_like_image(url: &str) -> bool {
    let lower = url.to_lowercase();
    EXTENSION_RE.is_match(&lower) || DYNAMIC_IMAGE_HINTS.iter().any(|h| lower.contains(h))
}

fn harvest_denylisted(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.ends_with(".gif") || HARVEST_DENYLIST.iter().any(|needle| lower.contains(needle))
}

/// First srcset entry URL of each comma-separated candidate.
fn srcset_urls(srcset: &str) -> impl Iterator<Item = &str> {
    srcset
        .split(',')
        .filter_map(|entry| entry.split_whitespace().next())
}

/// Harvest candidate image URLs from a page.
///
/// Sources, in order: `img[src]`/`img[data-src]`, `srcset` entries,
/// `<noscript>` inner markup, `og:image`, `link[rel=image_src]`, and inline
/// `background-image` declarations. De-duplicated, filtered, capped.
pub fn harvest_images(html: &str, page_url: &str, cap: usize) -> Vec<String> {
    let base = match Url::parse(page_url) {
        Ok(base) => base,
        Err(_) => return Vec::new(),
    };

    let mut raw: Vec<String> = Vec::new();
    {
        let doc = Html::parse_document(html);

        let img_sel = selector("img");
        for img in doc.select(&img_sel) {
            for attr in ["src", "data-src"] {
                if let Some(value) = img.value().attr(attr) {
                    raw.push(value.to_string());
                }
            }
            if let Some(srcset) = img.value().attr("srcset") {
                raw.extend(srcset_urls(srcset).map(str::to_string));
            }
        }

        let source_sel = selector("source[srcset]");
        for source in doc.select(&source_sel) {
            if let Some(srcset) = source.value().attr("srcset") {
                raw.extend(srcset_urls(srcset).map(str::to_string));
            }
        }

        // Lazy-loading wrappers keep the real markup in <noscript>.
        let noscript_sel = selector("noscript");
        let inner_img_sel = selector("img");
        for noscript in doc.select(&noscript_sel) {
            let inner = Html::parse_fragment(&noscript.inner_html());
            for img in inner.select(&inner_img_sel) {
                if let Some(src) = img.value().attr("src") {
                    raw.push(src.to_string());
                }
            }
        }

        let og_sel = selector(r#"meta[property="og:image"]"#);
        for meta in doc.select(&og_sel) {
            if let Some(content) = meta.value().attr("content") {
                raw.push(content.to_string());
            }
        }

        let link_sel = selector(r#"link[rel="image_src"]"#);
        for link in doc.select(&link_sel) {
            if let Some(href) = link.value().attr("href") {
                raw.push(href.to_string());
            }
        }
    }

    for capture in BACKGROUND_IMAGE_RE.captures_iter(html) {
        raw.push(capture[1].to_string());
    }

    let mut seen: Vec<String> = Vec::new();
    for candidate in raw {
        if seen.len() >= cap {
            break;
        }
        let Some(absolute) = absolutize(&candidate, &base) else {
            continue;
        };
        if !looks_like_image(&absolute) || harvest_denylisted(&absolute) {
            continue;
        }
        if !seen.contains(&absolute) {
            seen.push(absolute);
        }
    }
    seen
}

/// `src` of a Naver-style nested content frame, when the page has one.
pub fn frame_src(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let frame_sel = selector("frame#mainFrame, iframe#mainFrame");
    doc.select(&frame_sel)
        .next()
        .and_then(|frame| frame.value().attr("src"))
        .map(str::to_string)
}

/// Fetch a page, follow its content frame if present, and extract both the
/// scorable text and the candidate images.
pub async fn extract_page(client: &PageClient, page_url: &str) -> Result<PageExtract, CrawlError> {
    let mut effective_url = page_url.to_string();
    let mut html = client.fetch_text(&effective_url).await?;

    if let Some(src) = frame_src(&html) {
        let base = Url::parse(&effective_url)
            .map_err(|e| CrawlError::invalid_url(&effective_url, e.to_string()))?;
        if let Some(frame_url) = absolutize(&src, &base) {
            debug!(frame = %frame_url, "following content frame");
            html = client.fetch_text(&frame_url).await?;
            effective_url = frame_url;
        }
    }

    let post = extract_post(&html);
    let candidates = harvest_images(
        &html,
        &effective_url,
        client.config().max_image_candidates,
    );

    let mut text = post.content;
    for extra in post.tags.iter().chain(post.alt_texts.iter()) {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(extra);
    }

    Ok(PageExtract { text, candidates })
}
