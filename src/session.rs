//! Session Registry
//!
//! Hands out one isolated [`RangeCache`] per session. Caches are never shared
//! between sessions; removing a session drops its cache and cancels its
//! eviction timers.
//!
//! Clients are expected to close their sessions. Sessions that are abandoned
//! instead are reaped by [`SessionRegistry::sweep_idle`], which the service
//! runs periodically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};
use tracing::info;

use crate::cache::{CacheSettings, RangeCache};
use crate::error::{CacheError, Result};
use crate::fetch::Fetcher;

/// A session's cache and the last time the session was used.
struct Session {
    cache: RangeCache,
    last_used: Instant,
}

/// Registry of live sessions and their caches.
pub struct SessionRegistry {
    fetcher: Arc<dyn Fetcher>,
    settings: CacheSettings,
    sessions: RwLock<HashMap<String, Session>>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    /// Creates an empty registry.
    ///
    /// # Arguments
    /// * `fetcher` - Upstream shared by every session cache
    /// * `settings` - Eviction and size settings for every session cache
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: CacheSettings) -> Self {
        Self {
            fetcher,
            settings,
            sessions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Opens a session with an empty cache and returns its id.
    pub async fn create(&self) -> String {
        let id = format!("session-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let session = Session {
            cache: RangeCache::with_settings(self.fetcher.clone(), self.settings),
            last_used: Instant::now(),
        };
        self.sessions.write().await.insert(id.clone(), session);
        info!("Opened {}", id);
        id
    }

    /// The cache belonging to session `id`. Counts as a use of the session.
    ///
    /// # Arguments
    /// * `id` - Session id returned by [`create`](Self::create)
    pub async fn get(&self, id: &str) -> Result<RangeCache> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| CacheError::NotFound(format!("Unknown session: {}", id)))?;
        session.last_used = Instant::now();
        Ok(session.cache.clone())
    }

    /// Closes session `id`, clearing its cache.
    ///
    /// # Arguments
    /// * `id` - Session id returned by [`create`](Self::create)
    pub async fn remove(&self, id: &str) -> Result<()> {
        let session = self
            .sessions
            .write()
            .await
            .remove(id)
            .ok_or_else(|| CacheError::NotFound(format!("Unknown session: {}", id)))?;
        // In-flight reads may still hold clones; clearing cancels the timers now.
        session.cache.clear_cache();
        info!("Closed {}", id);
        Ok(())
    }

    // == Idle Sweep ==
    /// Closes every session unused for at least `max_idle`.
    ///
    /// # Arguments
    /// * `max_idle` - Time since the last create or lookup after which a
    ///   session is considered abandoned
    ///
    /// # Returns
    /// The number of sessions closed.
    pub async fn sweep_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, session| {
            let keep = now.duration_since(session.last_used) < max_idle;
            if !keep {
                session.cache.clear_cache();
                info!("Closed idle {}", id);
            }
            keep
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
