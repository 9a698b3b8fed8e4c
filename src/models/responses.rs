//! Response DTOs for the range cache API
//!
//! Defines the structure of outgoing JSON response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for session creation (POST /sessions)
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
}

impl SessionResponse {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}

/// Response body for session removal (DELETE /sessions/:id)
#[derive(Debug, Clone, Serialize)]
pub struct CloseResponse {
    /// Success message
    pub message: String,
    pub session_id: String,
}

impl CloseResponse {
    pub fn new(session_id: impl Into<String>) -> Self {
        let session_id = session_id.into();
        Self {
            message: format!("Session '{}' closed", session_id),
            session_id,
        }
    }
}

/// Response body for cache clearing (DELETE /sessions/:id/cache)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Number of cached documents dropped
    pub cleared: usize,
}

/// Response body for the stats endpoint (GET /sessions/:id/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Reads served from cache
    pub hits: u64,
    /// Cold reads
    pub misses: u64,
    /// Timer evictions
    pub evictions: u64,
    /// Upstream requests issued
    pub upstream_fetches: u64,
    /// Plain GETs issued after a 501
    pub fallback_fetches: u64,
    /// Current number of cached documents
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            fallback_fetches: stats.extra_fetches(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            upstream_fetches: stats.upstream_fetches,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
