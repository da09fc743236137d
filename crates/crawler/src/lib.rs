//! # Blog crawler
//!
//! Fetches recent posts of a blog and extracts the signals the classifier
//! consumes: content text, `#`-tags, image alt texts, and candidate image
//! URLs for perceptual matching.
//!
//! Naver and Tistory blogs are crawled through their feeds; anything else
//! falls back to scanning the home page for post-looking links. The crawl is
//! deliberately sequential with a delay between post fetches, and a single
//! failing post never aborts the crawl.

mod client;
mod crawl;
mod error;
mod extract;
mod feed;
mod platform;
mod types;

pub use client::{safe_referer, CrawlerConfig, PageClient};
pub use crawl::fetch_posts;
pub use error::CrawlError;
pub use extract::{extract_page, extract_post, harvest_images, PostContent};
pub use feed::{parse_entries, FeedEntry};
pub use platform::Platform;
pub use types::{PageExtract, Post};
