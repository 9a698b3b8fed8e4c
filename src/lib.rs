//! PDF Range Cache - byte-range reads of remote documents
//!
//! Serves byte ranges of large documents fetched over HTTP, caching full
//! bodies per session with inactivity and lifetime eviction, and gates
//! `file://` access behind an allow-list.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod session;
pub mod tasks;
pub mod validation;

pub use api::AppState;
pub use cache::{RangeCache, RangeRead};
pub use config::Config;
pub use fetch::{Fetcher, HttpFetcher};
pub use validation::{path_to_file_url, UrlValidator, ValidationResult};
