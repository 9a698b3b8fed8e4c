//! Cache Entry Module
//!
//! Defines one fully-downloaded document body and the two eviction timers
//! that belong to it.

use std::time::Duration;

use bytes::Bytes;
use tokio::task::JoinHandle;
use tokio::time::Instant;

// == Cache Entry ==
/// A cached full document body.
///
/// The entry owns both of its eviction timers; dropping the entry aborts
/// them, so removing it from the map can never leave a timer behind.
#[derive(Debug)]
pub struct CacheEntry {
    /// Unique per cache instance; timers only act on the entry they were armed for
    pub(crate) id: u64,
    data: Bytes,
    created_at: Instant,
    last_accessed_at: Instant,
    inactivity_timer: JoinHandle<()>,
    lifetime_timer: JoinHandle<()>,
}

impl CacheEntry {
    // == Constructor ==
    pub(crate) fn new(
        id: u64,
        data: Bytes,
        now: Instant,
        inactivity_timer: JoinHandle<()>,
        lifetime_timer: JoinHandle<()>,
    ) -> Self {
        Self {
            id,
            data,
            created_at: now,
            last_accessed_at: now,
            inactivity_timer,
            lifetime_timer,
        }
    }

    /// The full document body.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Length of the full body.
    pub fn total_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn last_accessed_at(&self) -> Instant {
        self.last_accessed_at
    }

    /// Time since the last hit (or insertion).
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_accessed_at)
    }

    /// Time since insertion.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    // == Touch ==
    /// Records a hit at `now` and swaps in a freshly armed inactivity timer.
    ///
    /// The lifetime timer is left alone.
    pub(crate) fn touch(&mut self, now: Instant, inactivity_timer: JoinHandle<()>) {
        self.last_accessed_at = now;
        let previous = std::mem::replace(&mut self.inactivity_timer, inactivity_timer);
        previous.abort();
    }
}

impl Drop for CacheEntry {
    fn drop(&mut self) {
        self.inactivity_timer.abort();
        self.lifetime_timer.abort();
    }
}
