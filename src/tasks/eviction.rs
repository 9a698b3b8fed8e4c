//! Eviction Timers
//!
//! Each cached entry owns two timer tasks: an inactivity timer, re-armed on
//! every hit, and a lifetime timer armed once at insertion. Either one
//! removes the entry when it fires; removal drops the entry, which aborts the
//! other timer.
//!
//! Timers hold a weak reference to the cache state so a dropped cache is
//! never kept alive by its pending timers.

use std::sync::{Mutex, Weak};

use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::debug;

use crate::cache::{lock_state, CacheState};

/// Spawns the inactivity timer for entry `entry_id` of `url`.
///
/// At `deadline` the entry is evicted if it is still the same entry and has
/// seen no hit for `timeout`.
pub(crate) fn spawn_inactivity_timer(
    state: Weak<Mutex<CacheState>>,
    url: String,
    entry_id: u64,
    deadline: Instant,
    timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        sleep_until(deadline).await;

        let Some(state) = state.upgrade() else {
            return;
        };
        let evicted = lock_state(&state).evict_idle(&url, entry_id, timeout, Instant::now());
        if evicted {
            debug!("Evicted {} after {:?} of inactivity", url, timeout);
        }
    })
}

/// Spawns the lifetime timer for entry `entry_id` of `url`.
pub(crate) fn spawn_lifetime_timer(
    state: Weak<Mutex<CacheState>>,
    url: String,
    entry_id: u64,
    deadline: Instant,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        sleep_until(deadline).await;

        let Some(state) = state.upgrade() else {
            return;
        };
        let evicted = lock_state(&state).evict_expired(&url, entry_id);
        if evicted {
            debug!("Evicted {} at end of its lifetime", url);
        }
    })
}
