//! Route-level tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use perceptual::Region;
use server::{build_router, ServerConfig, ServerState};
use signatures::{Signature, SignatureStore};

const BOUNDARY: &str = "sponsorscope-test-boundary";

fn banner_png() -> Vec<u8> {
    let img = image::GrayImage::from_fn(600, 150, |x, _| image::Luma([(x * 255 / 599) as u8]));
    let mut out = Vec::new();
    image::DynamicImage::ImageLuma8(img)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

fn router_with_store(store: Option<SignatureStore>) -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("signatures.json");
    if let Some(store) = store {
        store.save(&path).unwrap();
    }

    let config = ServerConfig {
        signatures_path: path,
        ..ServerConfig::default()
    };
    let state = Arc::new(ServerState::new(config).unwrap());
    (build_router(state), dir)
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: image/png\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn post_multipart(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_returns_ok() {
    let (router, _dir) = router_with_store(None);
    let response = router.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn readiness_reports_signature_count() {
    let mut store = SignatureStore::default();
    store.push(Signature::new("naver-coop", Region::Whole, 42));
    let (router, _dir) = router_with_store(Some(store));

    let response = router.oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["components"]["signatures"], 1);
}

#[tokio::test]
async fn root_lists_endpoints() {
    let (router, _dir) = router_with_store(None);
    let response = router.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["name"], "sponsorscope");
    assert!(body["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e == "/api/analyze"));
}

#[tokio::test]
async fn unknown_route_is_structured_404() {
    let (router, _dir) = router_with_store(None);
    let response = router.oneshot(get("/api/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn analyze_requires_url() {
    let (router, _dir) = router_with_store(None);
    let response = router.oneshot(get("/api/analyze")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION");
}

#[tokio::test]
async fn banner_requires_image_urls() {
    let (router, _dir) = router_with_store(None);
    let response = router
        .oneshot(post_json("/api/detect/banner", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION");
}

#[tokio::test]
async fn banner_with_empty_store_is_rejected() {
    let (router, _dir) = router_with_store(None);
    let response = router
        .oneshot(post_json(
            "/api/detect/banner",
            serde_json::json!({ "images": ["https://cdn.test/banner.png"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "NO_SIGNATURES");
}

#[tokio::test]
async fn from_page_requires_page_url() {
    let (router, _dir) = router_with_store(None);
    let response = router
        .oneshot(post_json("/api/detect/from-page", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION");
}

#[tokio::test]
async fn from_page_with_empty_store_is_rejected() {
    let (router, _dir) = router_with_store(None);
    let response = router
        .oneshot(post_json(
            "/api/detect/from-page",
            serde_json::json!({ "page_url": "https://blog.test/post/1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "NO_SIGNATURES");
}

#[tokio::test]
async fn banner_file_requires_file_field() {
    let mut store = SignatureStore::default();
    store.push(Signature::new("naver-coop", Region::Whole, 42));
    let (router, _dir) = router_with_store(Some(store));

    let body = multipart_body(&[("threshold", None, b"6".as_slice())]);
    let response = router
        .oneshot(post_multipart("/api/detect/banner-file", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION");
}

#[tokio::test]
async fn banner_file_matches_known_banner() {
    let png = banner_png();
    let hash = perceptual::average_hash(&png, Region::Whole).unwrap();
    let mut store = SignatureStore::default();
    store.push(Signature::new("naver-coop", Region::Whole, hash));
    let (router, _dir) = router_with_store(Some(store));

    let body = multipart_body(&[("file", Some("banner.png"), png.as_slice())]);
    let response = router
        .oneshot(post_multipart("/api/detect/banner-file", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["summary"]["label"], "sponsored");
    assert_eq!(body["summary"]["source"], "naver-coop");
    assert_eq!(body["summary"]["distance"], 0);
}

#[tokio::test]
async fn banner_file_relaxed_threshold_still_capped() {
    let png = banner_png();
    let hash = perceptual::average_hash(&png, Region::Whole).unwrap();
    // 8 flipped bits: within a caller threshold of 10, outside the strict
    // upload ceiling of 6.
    let mut store = SignatureStore::default();
    store.push(Signature::new("naver-coop", Region::Whole, hash ^ 0xff));
    let (router, _dir) = router_with_store(Some(store));

    let body = multipart_body(&[
        ("file", Some("banner.png"), png.as_slice()),
        ("threshold", None, b"10".as_slice()),
    ]);
    let response = router
        .oneshot(post_multipart("/api/detect/banner-file", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["summary"]["label"], "none");
    assert_eq!(body["summary"]["distance"], 8);
}

#[tokio::test]
async fn banner_file_far_image_is_not_sponsored() {
    let png = banner_png();
    let hash = perceptual::average_hash(&png, Region::Whole).unwrap();
    let mut store = SignatureStore::default();
    store.push(Signature::new("naver-coop", Region::Whole, !hash));
    let (router, _dir) = router_with_store(Some(store));

    let body = multipart_body(&[("file", Some("banner.png"), png.as_slice())]);
    let response = router
        .oneshot(post_multipart("/api/detect/banner-file", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["summary"]["label"], "none");
    assert_eq!(body["summary"]["distance"], 64);
}
