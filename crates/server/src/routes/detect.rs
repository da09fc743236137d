//! Banner detection endpoints: URL batches, uploads, and the single-shot
//! page pipeline that fuses text and banner signals.

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use classify::{fuse, score, BannerSignal, ScorePolicy, FUSION_DISTANCE};

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;

#[derive(Debug, Default, Deserialize)]
pub struct BannerRequest {
    /// Page to scrape image URLs from.
    pub url: Option<String>,
    /// Explicit image URLs to match.
    pub images: Option<Vec<String>>,
    pub threshold: Option<u32>,
}

/// POST /api/detect/banner
///
/// Matches a batch of candidate images against the signature store. Images
/// come from the request body, a scraped page, or both.
pub async fn detect_banner(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<BannerRequest>,
) -> ServerResult<impl IntoResponse> {
    let mut urls = request.images.unwrap_or_default();

    if let Some(page_url) = request.url.as_deref().filter(|u| !u.trim().is_empty()) {
        let html = state.page_client.fetch_text(page_url).await?;
        urls.extend(crawler::harvest_images(
            &html,
            page_url,
            state.page_client.config().max_image_candidates,
        ));
    }

    let mut deduped: Vec<String> = Vec::with_capacity(urls.len());
    for url in urls {
        if !url.trim().is_empty() && !deduped.contains(&url) {
            deduped.push(url);
        }
    }
    if deduped.is_empty() {
        return Err(ServerError::Validation(
            "no image urls to match; pass 'images' or a scrapeable 'url'".into(),
        ));
    }

    let batch = state
        .matcher
        .match_image_urls(&deduped, request.threshold)
        .await?;

    info!(
        images = deduped.len(),
        matched = batch.winner.is_some(),
        "banner batch detected"
    );
    Ok(Json(batch))
}

/// POST /api/detect/banner-file
///
/// Matches one uploaded image against the signature store. Multipart fields:
/// `file` (or `image`) carrying the bytes, optional `threshold`. A `sponsored`
/// label additionally requires the strict upload ceiling, whatever threshold
/// the caller relaxed the comparison to.
pub async fn detect_banner_file(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> ServerResult<impl IntoResponse> {
    let mut bytes: Option<Vec<u8>> = None;
    let mut threshold: Option<u32> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") | Some("image") => bytes = Some(field.bytes().await?.to_vec()),
            Some("threshold") => threshold = field.text().await?.trim().parse().ok(),
            _ => {}
        }
    }

    let bytes = bytes.ok_or_else(|| {
        ServerError::Validation("multipart field 'file' with the image is required".into())
    })?;

    let best = state.matcher.match_buffer(&bytes, threshold)?;
    let strict_cap = state.matcher.config().upload_threshold;
    let summary = match best {
        Some(hit) if hit.matched && hit.distance <= strict_cap => json!({
            "label": "sponsored",
            "source": hit.name,
            "distance": hit.distance,
        }),
        Some(hit) => json!({ "label": "none", "distance": hit.distance }),
        None => json!({ "label": "none" }),
    };

    Ok(Json(json!({ "summary": summary })))
}

#[derive(Debug, Default, Deserialize)]
pub struct FromPageRequest {
    pub page_url: Option<String>,
    pub threshold: Option<u32>,
}

/// POST /api/detect/from-page
///
/// The single-shot pipeline: extract the page's text and image candidates,
/// score the text with the weighted policy, match the candidates, and fuse.
pub async fn detect_from_page(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<FromPageRequest>,
) -> ServerResult<impl IntoResponse> {
    let page_url = request
        .page_url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ServerError::Validation("'page_url' is required".into()))?;
    if state.store.is_empty() {
        return Err(ServerError::NoSignatures);
    }

    let extract = crawler::extract_page(&state.page_client, &page_url).await?;
    let text_score = score(&extract.text, &state.lexicon, &ScorePolicy::weighted());

    let threshold = request.threshold.unwrap_or(FUSION_DISTANCE);
    let banner = if extract.candidates.is_empty() {
        None
    } else {
        let batch = state
            .matcher
            .match_image_urls(&extract.candidates, Some(threshold))
            .await?;
        batch.winner.map(|winner| BannerSignal {
            source: winner.source,
            distance: winner.distance,
            matched: winner.matched,
            banner_shaped: winner.banner_shaped,
        })
    };

    let decision = fuse(&text_score, banner.as_ref(), threshold);
    info!(page = %page_url, label = ?decision.label, "page detected");

    Ok(Json(json!({
        "label": decision.label,
        "source": decision.source,
        "distance": decision.distance,
        "sponsored_score": text_score.sponsored,
        "self_paid_score": text_score.self_paid,
        "candidates": extract.candidates.len(),
    })))
}
