//! Request and Response models for the range cache API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP query strings and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{RangeQuery, ValidateQuery};
pub use responses::{
    ClearResponse, CloseResponse, HealthResponse, SessionResponse, StatsResponse,
};
