//! Error types for the range cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the range cache and its HTTP surface.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Transport failure or an upstream status outside 200/206/501
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Full body exceeds the cacheable size limit
    #[error("PDF too large: {size} bytes exceeds limit of {limit} bytes")]
    PdfTooLarge { size: u64, limit: u64 },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// URL rejected by the validator
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unknown session or resource
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Shorthand for building a [`CacheError::Fetch`].
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        CacheError::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::Fetch { .. } => StatusCode::BAD_GATEWAY,
            CacheError::PdfTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Forbidden(_) => StatusCode::FORBIDDEN,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the range cache.
pub type Result<T> = std::result::Result<T, CacheError>;
