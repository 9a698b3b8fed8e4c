//! API Handlers
//!
//! HTTP request handlers for each range cache endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::fetch::Fetcher;
use crate::models::{
    ClearResponse, CloseResponse, HealthResponse, RangeQuery, SessionResponse, StatsResponse,
    ValidateQuery,
};
use crate::session::SessionRegistry;
use crate::validation::{UrlValidator, ValidationResult};

/// Response header carrying the full document size on range reads.
pub const TOTAL_BYTES_HEADER: &str = "x-total-bytes";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Per-session range caches
    pub sessions: Arc<SessionRegistry>,
    /// Gate for file:// access
    pub validator: Arc<UrlValidator>,
}

impl AppState {
    pub fn new(sessions: SessionRegistry, validator: UrlValidator) -> Self {
        Self {
            sessions: Arc::new(sessions),
            validator: Arc::new(validator),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Every session cache uses the configured settings; the validator
    /// starts from the configured allow-list.
    pub fn from_config(config: &Config, fetcher: Arc<dyn Fetcher>) -> Self {
        Self::new(
            SessionRegistry::new(fetcher, config.cache_settings()),
            UrlValidator::new(config.allow_list()),
        )
    }
}

/// Handler for POST /sessions
pub async fn create_session_handler(State(state): State<AppState>) -> Json<SessionResponse> {
    let id = state.sessions.create().await;
    Json(SessionResponse::new(id))
}

/// Handler for DELETE /sessions/:id
pub async fn close_session_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CloseResponse>> {
    state.sessions.remove(&id).await?;
    Ok(Json(CloseResponse::new(id)))
}

/// Handler for GET /sessions/:id/range
///
/// Validates the URL, then reads through the session's cache. The body is
/// the raw byte slice; the document size travels in `X-Total-Bytes`.
pub async fn range_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RangeQuery>,
) -> Result<Response> {
    if let Some(error_msg) = query.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let cache = state.sessions.get(&id).await?;

    let validation = state.validator.validate_url(&query.url);
    if !validation.valid {
        return Err(CacheError::Forbidden(
            validation.error.unwrap_or_else(|| query.url.clone()),
        ));
    }

    let read = cache
        .read_range(&query.url, query.start, query.length)
        .await?;

    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        ),
        (
            HeaderName::from_static(TOTAL_BYTES_HEADER),
            HeaderValue::from(read.total_bytes),
        ),
    ];
    Ok((headers, read.data).into_response())
}

/// Handler for DELETE /sessions/:id/cache
pub async fn clear_cache_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClearResponse>> {
    let cache = state.sessions.get(&id).await?;
    let cleared = cache.clear_cache();
    Ok(Json(ClearResponse { cleared }))
}

/// Handler for GET /sessions/:id/stats
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatsResponse>> {
    let cache = state.sessions.get(&id).await?;
    Ok(Json(StatsResponse::from(cache.stats())))
}

/// Handler for GET /validate
pub async fn validate_handler(
    State(state): State<AppState>,
    Query(query): Query<ValidateQuery>,
) -> Json<ValidationResult> {
    Json(state.validator.validate_url(&query.url))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
