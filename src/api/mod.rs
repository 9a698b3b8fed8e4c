//! API Module
//!
//! HTTP handlers and routing for the range cache service.
//!
//! # Endpoints
//! - `POST /sessions` - Open a session
//! - `DELETE /sessions/:id` - Close a session
//! - `GET /sessions/:id/range` - Read a byte range
//! - `DELETE /sessions/:id/cache` - Clear a session's cache
//! - `GET /sessions/:id/stats` - Session cache statistics
//! - `GET /validate` - Validate a URL against the allow-list
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
