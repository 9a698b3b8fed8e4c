//! Cache Module
//!
//! Provides the session-scoped range cache: full-body entries keyed by URL,
//! evicted by an inactivity timer and an absolute lifetime timer.

mod entry;
mod stats;
mod store;


use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::{RangeCache, RangeRead};

pub(crate) use store::CacheState;

// == Public Constants ==
/// Idle time after which an entry is evicted
pub const CACHE_INACTIVITY_TIMEOUT_MS: u64 = 10_000;

/// Absolute age after which an entry is evicted
pub const CACHE_MAX_LIFETIME_MS: u64 = 60_000;

/// Largest full body the cache will store
pub const CACHE_MAX_PDF_SIZE_BYTES: u64 = 50 * 1024 * 1024; // 50 MiB

// == Cache Settings ==
/// Eviction and size parameters for one [`RangeCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Evict after this long without a hit
    pub inactivity_timeout: Duration,
    /// Evict this long after insertion, regardless of access
    pub max_lifetime: Duration,
    /// Reject full bodies larger than this
    pub max_pdf_size_bytes: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            inactivity_timeout: Duration::from_millis(CACHE_INACTIVITY_TIMEOUT_MS),
            max_lifetime: Duration::from_millis(CACHE_MAX_LIFETIME_MS),
            max_pdf_size_bytes: CACHE_MAX_PDF_SIZE_BYTES,
        }
    }
}

/// Locks the shared cache state, recovering the guard if a holder panicked.
pub(crate) fn lock_state(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}
