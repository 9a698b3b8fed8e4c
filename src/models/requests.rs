//! Request DTOs for the range cache API
//!
//! Defines the query strings accepted by the HTTP endpoints.

use serde::Deserialize;

/// Query for the range read (GET /sessions/:id/range)
///
/// # Fields
/// - `url`: Document URL, remote or `file://`
/// - `start`: First byte offset
/// - `length`: Number of bytes to read
#[derive(Debug, Clone, Deserialize)]
pub struct RangeQuery {
    pub url: String,
    #[serde(default)]
    pub start: u64,
    pub length: u64,
}

impl RangeQuery {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.url.trim().is_empty() {
            return Some("URL cannot be empty".to_string());
        }
        if self.start.checked_add(self.length).is_none() {
            return Some("Range end overflows".to_string());
        }
        None
    }
}

/// Query for URL validation (GET /validate)
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateQuery {
    pub url: String,
}
