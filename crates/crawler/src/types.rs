use serde::{Deserialize, Serialize};

/// One crawled blog post.
///
/// `content` may be empty when the post page itself failed to fetch; the
/// feed-level fields are still useful for classification then.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
    pub summary: String,
    pub content: String,
    /// `#`-prefixed anchor and span texts found on the post page.
    pub tags: Vec<String>,
    /// Alt texts of every image on the post page.
    pub alt_texts: Vec<String>,
}

impl Post {
    /// All textual signal of the post joined for scoring.
    pub fn combined_text(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.title, &self.summary, &self.content];
        parts.extend(self.tags.iter().map(String::as_str));
        parts.extend(self.alt_texts.iter().map(String::as_str));
        parts.retain(|p| !p.is_empty());
        parts.join(" ")
    }
}

/// Result of on-demand single-page extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageExtract {
    /// Visible text of the content area plus alt texts and tags.
    pub text: String,
    /// Candidate image URLs, absolutized, denylist-filtered, capped.
    pub candidates: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_text_skips_empty_parts() {
        let post = Post {
            title: "리뷰".into(),
            link: "https://blog.example/1".into(),
            tags: vec!["#내돈내산".into()],
            ..Post::default()
        };
        assert_eq!(post.combined_text(), "리뷰 #내돈내산");
    }
}
