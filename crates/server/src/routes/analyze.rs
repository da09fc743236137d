//! Whole-blog analysis: crawl recent posts and classify each one.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use classify::{decide_text, score, Evidence, Label, ScorePolicy};

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    pub url: Option<String>,
}

/// Per-post classification result.
#[derive(Debug, Serialize)]
pub struct PostResult {
    pub title: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
    pub label: Label,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub sponsored_score: i32,
    pub self_score: i32,
    pub evidence: Vec<Evidence>,
}

/// GET /api/analyze?url=<blog url>
///
/// Crawls the blog's recent posts and scores each with the basic policy.
pub async fn analyze_blog(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<AnalyzeParams>,
) -> ServerResult<impl IntoResponse> {
    let url = params
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ServerError::Validation("query parameter 'url' is required".into()))?;

    let posts = crawler::fetch_posts(&state.page_client, &url).await?;
    let policy = ScorePolicy::basic();

    let results: Vec<PostResult> = posts
        .iter()
        .map(|post| {
            let text_score = score(&post.combined_text(), &state.lexicon, &policy);
            let decision = decide_text(&text_score);
            PostResult {
                title: post.title.clone(),
                link: post.link.clone(),
                pub_date: post.pub_date.clone(),
                label: decision.label,
                confidence: decision.confidence,
                sponsored_score: text_score.sponsored,
                self_score: text_score.self_paid,
                evidence: decision.evidence,
            }
        })
        .collect();

    info!(blog = %url, posts = results.len(), "blog analyzed");
    Ok(Json(json!({
        "count": results.len(),
        "results": results,
    })))
}
