//! API Routes
//!
//! Configures the Axum router with all range cache endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_cache_handler, close_session_handler, create_session_handler, health_handler,
    range_handler, stats_handler, validate_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /sessions` - Open a session with its own cache
/// - `DELETE /sessions/:id` - Close a session
/// - `GET /sessions/:id/range` - Read a byte range of a document
/// - `DELETE /sessions/:id/cache` - Clear a session's cache
/// - `GET /sessions/:id/stats` - Cache statistics for a session
/// - `GET /validate` - Check whether a URL may be read
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/sessions", post(create_session_handler))
        .route("/sessions/:id", delete(close_session_handler))
        .route("/sessions/:id/range", get(range_handler))
        .route("/sessions/:id/cache", delete(clear_cache_handler))
        .route("/sessions/:id/stats", get(stats_handler))
        .route("/validate", get(validate_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheSettings;
    use crate::fetch::stub::{StubFetcher, StubMode};
    use crate::session::SessionRegistry;
    use crate::validation::UrlValidator;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    async fn status_of(method: Method, uri: &str) -> StatusCode {
        let fetcher = Arc::new(StubFetcher::new(StubMode::HonorsRanges, &b"%PDF-1.7"[..]));
        let app = create_router(AppState::new(
            SessionRegistry::new(fetcher, CacheSettings::default()),
            UrlValidator::default(),
        ));
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_service_routes_respond() {
        assert_eq!(status_of(Method::GET, "/health").await, StatusCode::OK);
        assert_eq!(status_of(Method::POST, "/sessions").await, StatusCode::OK);
        assert_eq!(
            status_of(Method::GET, "/validate?url=https%3A%2F%2Fexample.com%2Fa.pdf").await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_session_routes_require_known_session() {
        for (method, uri) in [
            (Method::GET, "/sessions/missing/stats"),
            (Method::DELETE, "/sessions/missing/cache"),
            (Method::DELETE, "/sessions/missing"),
        ] {
            assert_eq!(status_of(method, uri).await, StatusCode::NOT_FOUND, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_range_missing_length_is_bad_request() {
        let status = status_of(
            Method::GET,
            "/sessions/any/range?url=https%3A%2F%2Fexample.com%2Fa.pdf",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wrong_method_is_rejected() {
        assert_eq!(
            status_of(Method::GET, "/sessions").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
