//! Range Cache Module
//!
//! Serves byte-range reads of remote documents. A read either slices a cached
//! full body or goes upstream with a Range request:
//!
//! - 206: the bytes are returned as-is and never cached
//! - 200: the server ignored the range; the whole body is cached and sliced
//! - 501: ranges are unsupported; one plain GET is issued and handled as 200
//!
//! The entry map is guarded by a `std::sync::Mutex` that is never held across
//! an upstream await.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::cache::{lock_state, CacheEntry, CacheSettings, CacheStats};
use crate::error::{CacheError, Result};
use crate::fetch::{
    content_range_total, ByteRange, FetchOutcome, Fetcher, UpstreamResponse, STATUS_OK,
};
use crate::tasks::{spawn_inactivity_timer, spawn_lifetime_timer};

// == Range Read ==
/// Result of [`RangeCache::read_range`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRead {
    /// The requested bytes, clamped to the document end
    pub data: Bytes,
    /// Size of the whole document
    pub total_bytes: u64,
}

// == Cache State ==
/// Mutable state behind the cache lock.
#[derive(Debug, Default)]
pub(crate) struct CacheState {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
    next_entry_id: u64,
    /// Bumped by every clear; cold reads begun under an older generation do not insert
    generation: u64,
}

impl CacheState {
    pub(crate) fn stats(&self) -> &CacheStats {
        &self.stats
    }

    // == Timer Evictions ==
    /// Removes the entry for `url` if it is still entry `entry_id` and has been
    /// idle for at least `timeout`.
    ///
    /// A timer that lost a race with a hit finds the access time moved forward
    /// and leaves the entry to its replacement timer.
    pub(crate) fn evict_idle(
        &mut self,
        url: &str,
        entry_id: u64,
        timeout: Duration,
        now: Instant,
    ) -> bool {
        let idle = self
            .entries
            .get(url)
            .is_some_and(|entry| entry.id == entry_id && entry.idle_for(now) >= timeout);
        idle && self.evict(url)
    }

    /// Removes the entry for `url` if it is still entry `entry_id`.
    pub(crate) fn evict_expired(&mut self, url: &str, entry_id: u64) -> bool {
        let current = self
            .entries
            .get(url)
            .is_some_and(|entry| entry.id == entry_id);
        current && self.evict(url)
    }

    fn evict(&mut self, url: &str) -> bool {
        // Dropping the entry aborts both of its timers.
        let removed = self.entries.remove(url).is_some();
        if removed {
            self.stats.record_eviction();
        }
        removed
    }
}

// == Range Cache ==
/// Session-scoped byte-range cache.
///
/// Clones share the same entries; separately constructed caches never do.
#[derive(Clone)]
pub struct RangeCache {
    state: Arc<Mutex<CacheState>>,
    fetcher: Arc<dyn Fetcher>,
    settings: CacheSettings,
}

impl RangeCache {
    // == Constructor ==
    /// Creates an empty cache with the default eviction and size settings.
    ///
    /// # Arguments
    /// * `fetcher` - Upstream used for every cold read
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self::with_settings(fetcher, CacheSettings::default())
    }

    /// Creates an empty cache with custom settings.
    ///
    /// # Arguments
    /// * `fetcher` - Upstream used for every cold read
    /// * `settings` - Inactivity timeout, lifetime and size limit for entries
    pub fn with_settings(fetcher: Arc<dyn Fetcher>, settings: CacheSettings) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState::default())),
            fetcher,
            settings,
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    // == Read Range ==
    /// Reads `length` bytes of `url` starting at `start`.
    ///
    /// Must be called from within a tokio runtime; caching a full body arms
    /// its eviction timers as tasks.
    ///
    /// # Arguments
    /// * `url` - Document URL, also the cache key
    /// * `start` - Offset of the first byte
    /// * `length` - Number of bytes wanted; the slice is clamped to the document end
    ///
    /// # Returns
    /// The bytes read and the size of the whole document.
    ///
    /// # Example
    /// ```
    /// # use std::sync::Arc;
    /// # use std::time::Duration;
    /// use pdf_range_cache::{path_to_file_url, HttpFetcher, RangeCache};
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let dir = tempfile::tempdir()?;
    /// # let file = dir.path().join("doc.pdf");
    /// # std::fs::write(&file, b"%PDF-1.7 example")?;
    /// let cache = RangeCache::new(Arc::new(HttpFetcher::new(Duration::from_secs(5))?));
    /// let read = cache.read_range(&path_to_file_url(&file), 0, 8).await?;
    /// assert_eq!(&read.data[..], b"%PDF-1.7");
    /// assert_eq!(read.total_bytes, 16);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn read_range(&self, url: &str, start: u64, length: u64) -> Result<RangeRead> {
        let range = ByteRange::new(start, length);

        if let Some(read) = self.read_cached(url, range) {
            debug!("Cache hit for {} [{}+{}]", url, start, length);
            return Ok(read);
        }

        let generation = {
            let mut state = self.lock();
            state.stats.record_miss();
            state.generation
        };
        debug!("Cache miss for {} [{}+{}]", url, start, length);

        let response = self.fetch_upstream(url, Some(range)).await?;
        match FetchOutcome::classify(url, response)? {
            FetchOutcome::Partial(response) => self.read_partial(range, response).await,
            FetchOutcome::Full(response) => {
                self.store_full(url, range, response, generation).await
            }
            FetchOutcome::Unsupported => {
                info!(
                    "Upstream does not support range requests for {}, fetching full body",
                    url
                );
                let response = self.fetch_upstream(url, None).await?;
                if response.status != STATUS_OK {
                    return Err(CacheError::fetch(
                        url,
                        format!("unexpected upstream status {} on full fetch", response.status),
                    ));
                }
                self.store_full(url, range, response, generation).await
            }
        }
    }

    // == Clear ==
    /// Drops every entry and cancels every pending timer.
    ///
    /// Reads already in flight return their bytes but do not repopulate the
    /// cache.
    ///
    /// # Returns
    /// The number of entries removed.
    pub fn clear_cache(&self) -> usize {
        let mut state = self.lock();
        state.generation += 1;
        let cleared = state.entries.len();
        state.entries.clear();
        if cleared > 0 {
            info!("Cleared {} cached documents", cleared);
        }
        cleared
    }

    // == Size ==
    /// Number of live entries.
    pub fn cache_size(&self) -> usize {
        self.lock().entries.len()
    }

    // == Stats ==
    /// Snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        let mut stats = state.stats().clone();
        stats.set_total_entries(state.entries.len());
        stats
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        lock_state(&self.state)
    }

    /// Serves `range` from a cached entry, refreshing its inactivity timer.
    ///
    /// Lookup, access update and slicing happen under one lock, so a read
    /// that finds the entry always returns its bytes.
    fn read_cached(&self, url: &str, range: ByteRange) -> Option<RangeRead> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let entry = state.entries.get_mut(url)?;

        let now = Instant::now();
        let timer = spawn_inactivity_timer(
            Arc::downgrade(&self.state),
            url.to_string(),
            entry.id,
            now + self.settings.inactivity_timeout,
            self.settings.inactivity_timeout,
        );
        entry.touch(now, timer);

        let read = RangeRead {
            data: range.slice(entry.data()),
            total_bytes: entry.total_bytes(),
        };
        state.stats.record_hit();
        Some(read)
    }

    async fn fetch_upstream(&self, url: &str, range: Option<ByteRange>) -> Result<UpstreamResponse> {
        self.lock().stats.record_upstream_fetch();
        self.fetcher.fetch(url, range).await
    }

    /// Returns a 206 body without caching it.
    async fn read_partial(&self, range: ByteRange, response: UpstreamResponse) -> Result<RangeRead> {
        let advertised_total = response
            .headers
            .content_range
            .as_deref()
            .and_then(content_range_total);
        let data = response.read_body(None).await?;
        let total_bytes = advertised_total.unwrap_or(range.start + data.len() as u64);

        let data = if range.length == 0 { Bytes::new() } else { data };
        Ok(RangeRead { data, total_bytes })
    }

    /// Size-checks a full body, caches it and returns the requested slice.
    async fn store_full(
        &self,
        url: &str,
        range: ByteRange,
        response: UpstreamResponse,
        generation: u64,
    ) -> Result<RangeRead> {
        let limit = self.settings.max_pdf_size_bytes;
        if let Some(advertised) = response.headers.content_length {
            if advertised > limit {
                warn!(
                    "Refusing to cache {}: Content-Length {} exceeds {} bytes",
                    url, advertised, limit
                );
                return Err(CacheError::PdfTooLarge {
                    size: advertised,
                    limit,
                });
            }
        }

        let data = response.read_body(Some(limit)).await.map_err(|e| {
            if let CacheError::PdfTooLarge { .. } = e {
                warn!("Refusing to cache {}: body exceeds {} bytes", url, limit);
            }
            e
        })?;

        let read = RangeRead {
            data: range.slice(&data),
            total_bytes: data.len() as u64,
        };
        self.insert(url, data, generation);
        Ok(read)
    }

    fn insert(&self, url: &str, data: Bytes, generation: u64) {
        let mut state = self.lock();
        if state.generation != generation {
            debug!("Cache cleared while fetching {}, not storing", url);
            return;
        }

        state.next_entry_id += 1;
        let id = state.next_entry_id;
        let now = Instant::now();
        let inactivity = spawn_inactivity_timer(
            Arc::downgrade(&self.state),
            url.to_string(),
            id,
            now + self.settings.inactivity_timeout,
            self.settings.inactivity_timeout,
        );
        let lifetime = spawn_lifetime_timer(
            Arc::downgrade(&self.state),
            url.to_string(),
            id,
            now + self.settings.max_lifetime,
        );

        let total_bytes = data.len();
        let entry = CacheEntry::new(id, data, now, inactivity, lifetime);
        // A replaced entry from a concurrent cold read is dropped here, aborting its timers.
        if state.entries.insert(url.to_string(), entry).is_some() {
            debug!("Replaced existing cache entry for {}", url);
        }
        info!("Cached {} ({} bytes)", url, total_bytes);
    }
}

impl std::fmt::Debug for RangeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeCache")
            .field("entries", &self.cache_size())
            .field("settings", &self.settings)
            .finish()
    }
}
