//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle for each endpoint, with a wiremock
//! upstream behind the real fetcher.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use pdf_range_cache::{api::create_router, path_to_file_url, AppState, Config, HttpFetcher};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const BODY: &[u8] = b"%PDF-1.7\n1 0 obj << /Type /Catalog >> endobj\n%%EOF\n";

// == Helper Functions ==

fn create_test_app(config: &Config) -> Router {
    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
    create_router(AppState::from_config(config, Arc::new(fetcher)))
}

async fn upstream() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(BODY.to_vec()))
        .mount(&server)
        .await;
    server
}

async fn send(app: &Router, method: &str, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn open_session(app: &Router) -> String {
    let response = send(app, "POST", "/sessions").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    json["session_id"].as_str().unwrap().to_string()
}

fn encode(url: &str) -> String {
    url::form_urlencoded::byte_serialize(url.as_bytes()).collect()
}

// == Range Endpoint ==

#[tokio::test]
async fn test_range_read_returns_bytes_and_total() {
    let server = upstream().await;
    let app = create_test_app(&Config::default());
    let id = open_session(&app).await;
    let url = encode(&format!("{}/paper.pdf", server.uri()));

    let response = send(
        &app,
        "GET",
        &format!("/sessions/{}/range?url={}&start=0&length=8", id, url),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["x-total-bytes"],
        BODY.len().to_string().as_str()
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.7");
}

#[tokio::test]
async fn test_range_reads_served_from_cache() {
    let server = upstream().await;
    let app = create_test_app(&Config::default());
    let id = open_session(&app).await;
    let url = encode(&format!("{}/paper.pdf", server.uri()));

    for start in [0, 9, 40] {
        let response = send(
            &app,
            "GET",
            &format!("/sessions/{}/range?url={}&start={}&length=4", id, url, start),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = send(&app, "GET", &format!("/sessions/{}/stats", id)).await;
    let stats = body_to_json(response.into_body()).await;
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["hits"], 2);
    assert_eq!(stats["upstream_fetches"], 1);
    assert_eq!(stats["total_entries"], 1);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_sessions_do_not_share_caches() {
    let server = upstream().await;
    let app = create_test_app(&Config::default());
    let first = open_session(&app).await;
    let second = open_session(&app).await;
    assert_ne!(first, second);
    let url = encode(&format!("{}/paper.pdf", server.uri()));

    for id in [&first, &second] {
        let response = send(
            &app,
            "GET",
            &format!("/sessions/{}/range?url={}&start=0&length=4", id, url),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_range_upstream_error_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let app = create_test_app(&Config::default());
    let id = open_session(&app).await;
    let url = encode(&format!("{}/missing.pdf", server.uri()));

    let response = send(
        &app,
        "GET",
        &format!("/sessions/{}/range?url={}&start=0&length=4", id, url),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn test_range_too_large_is_payload_too_large() {
    let server = upstream().await;
    let config = Config {
        max_pdf_size_bytes: 16,
        ..Config::default()
    };
    let app = create_test_app(&config);
    let id = open_session(&app).await;
    let url = encode(&format!("{}/paper.pdf", server.uri()));

    let response = send(
        &app,
        "GET",
        &format!("/sessions/{}/range?url={}&start=0&length=4", id, url),
    )
    .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().starts_with("PDF too large"));
}

#[tokio::test]
async fn test_range_unknown_session_is_not_found() {
    let app = create_test_app(&Config::default());
    let response = send(
        &app,
        "GET",
        "/sessions/session-999/range?url=https%3A%2F%2Fexample.com%2Fa.pdf&length=4",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_range_empty_url_is_bad_request() {
    let app = create_test_app(&Config::default());
    let id = open_session(&app).await;

    let response = send(&app, "GET", &format!("/sessions/{}/range?url=&length=4", id)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// == Local Files ==

#[tokio::test]
async fn test_allowed_local_file_is_served() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("local.pdf");
    std::fs::write(&file, BODY).unwrap();

    let config = Config {
        allowed_dirs: vec![dir.path().to_path_buf()],
        ..Config::default()
    };
    let app = create_test_app(&config);
    let id = open_session(&app).await;
    let url = encode(&path_to_file_url(&file));

    let response = send(
        &app,
        "GET",
        &format!("/sessions/{}/range?url={}&start=9&length=5", id, url),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], &BODY[9..14]);
}

#[tokio::test]
async fn test_unlisted_local_file_is_forbidden() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("secret.pdf");
    std::fs::write(&file, BODY).unwrap();

    let app = create_test_app(&Config::default());
    let id = open_session(&app).await;
    let url = encode(&path_to_file_url(&file));

    let response = send(
        &app,
        "GET",
        &format!("/sessions/{}/range?url={}&start=0&length=4", id, url),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("not in allowed list"));
}

// == Session Lifecycle ==

#[tokio::test]
async fn test_clear_cache_endpoint() {
    let server = upstream().await;
    let app = create_test_app(&Config::default());
    let id = open_session(&app).await;
    let url = encode(&format!("{}/paper.pdf", server.uri()));

    send(
        &app,
        "GET",
        &format!("/sessions/{}/range?url={}&start=0&length=4", id, url),
    )
    .await;

    let response = send(&app, "DELETE", &format!("/sessions/{}/cache", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["cleared"], 1);

    send(
        &app,
        "GET",
        &format!("/sessions/{}/range?url={}&start=0&length=4", id, url),
    )
    .await;
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_close_session_endpoint() {
    let app = create_test_app(&Config::default());
    let id = open_session(&app).await;

    let response = send(&app, "DELETE", &format!("/sessions/{}", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["session_id"], id.as_str());

    let response = send(&app, "GET", &format!("/sessions/{}/stats", id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == Validate and Health ==

#[tokio::test]
async fn test_validate_endpoint_reports_errors() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        allowed_dirs: vec![dir.path().to_path_buf()],
        ..Config::default()
    };
    let app = create_test_app(&config);

    let remote = encode("https://example.com/a.pdf");
    let response = send(&app, "GET", &format!("/validate?url={}", remote)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["valid"], true);
    assert!(json.get("error").is_none());

    let missing = encode(&path_to_file_url(&dir.path().join("missing.pdf")));
    let response = send(&app, "GET", &format!("/validate?url={}", missing)).await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["valid"], false);
    assert!(json["error"].as_str().unwrap().contains("File not found"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(&Config::default());

    let response = send(&app, "GET", "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}
