//! Background Tasks Module
//!
//! Contains the timer tasks that run alongside the range caches.
//!
//! # Tasks
//! - Inactivity eviction: removes an entry after a quiet period
//! - Lifetime eviction: removes an entry at a fixed age
//! - Session sweep: closes sessions that were abandoned without a DELETE

mod eviction;
mod session_sweep;

pub(crate) use eviction::{spawn_inactivity_timer, spawn_lifetime_timer};
pub use session_sweep::spawn_session_sweeper;
