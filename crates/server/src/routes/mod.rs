//! API route handlers
//!
//! - `health`: liveness and readiness probes
//! - `analyze`: whole-blog crawl + text classification
//! - `detect`: banner matching and single-page fused detection

pub mod analyze;
pub mod detect;
pub mod health;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// Root endpoint (GET /), unauthenticated.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "sponsorscope",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/api/analyze",
            "/api/detect/banner",
            "/api/detect/banner-file",
            "/api/detect/from-page",
            "/health",
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
