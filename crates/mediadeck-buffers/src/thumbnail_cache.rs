//! In-memory LRU cache for thumbnail bytes.
//!
//! Keys are thumbnail identities (normally the image URL). Each entry also
//! carries the instant it was stored: once older than `max_age` it counts as
//! a miss, whether or not capacity pressure has evicted it yet. Expired
//! entries are dropped lazily on access or in bulk by
//! [`ThumbnailCache::clean_expired`].

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use lru::LruCache;
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Bytes,
    inserted_at: Instant,
}

/// Hit/miss counters since the cache was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped to make room for a new key.
    pub evictions: u64,
    /// Entries dropped because they outlived `max_age`.
    pub expirations: u64,
}

/// Bounded LRU of thumbnail payloads with absolute age expiry.
pub struct ThumbnailCache {
    entries: LruCache<String, CacheEntry>,
    max_age: Duration,
    clock: Arc<dyn Clock>,
    stats: CacheStats,
}

impl ThumbnailCache {
    /// Create a cache holding at most `max_size` thumbnails (at least one),
    /// each valid for `max_age`.
    pub fn new(max_size: usize, max_age: Duration) -> Self {
        Self::with_clock(max_size, max_age, Arc::new(SystemClock))
    }

    pub fn with_clock(max_size: usize, max_age: Duration, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(max_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            max_age,
            clock,
            stats: CacheStats::default(),
        }
    }

    /// Fetch a payload and mark it most recently used.
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn get(&mut self, key: &str) -> Option<Bytes> {
        if self.expire_if_stale(key) {
            self.stats.misses += 1;
            return None;
        }

        match self.entries.get(key) {
            Some(entry) => {
                self.stats.hits += 1;
                trace!(key, "Thumbnail cache hit");
                Some(entry.payload.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Store a payload. A new key evicts the least recently used entry when
    /// the cache is full; an existing key gets a fresh payload, timestamp and
    /// recency.
    pub fn set(&mut self, key: impl Into<String>, payload: impl Into<Bytes>) {
        let key = key.into();
        let entry = CacheEntry {
            payload: payload.into(),
            inserted_at: self.clock.now(),
        };

        if let Some((evicted, _)) = self.entries.push(key.clone(), entry) {
            if evicted != key {
                self.stats.evictions += 1;
                debug!(
                    evicted = %evicted,
                    inserted = %key,
                    "Evicted least recently used thumbnail"
                );
            }
        }
    }

    /// Whether a live (non-expired) entry exists. Does not touch recency.
    pub fn has(&mut self, key: &str) -> bool {
        if self.expire_if_stale(key) {
            return false;
        }
        self.entries.contains(key)
    }

    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.pop(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn clean_expired(&mut self) -> usize {
        let now = self.clock.now();
        let stale: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| self.is_stale(entry, now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &stale {
            self.entries.pop(key.as_str());
        }

        self.stats.expirations += stale.len() as u64;
        if !stale.is_empty() {
            debug!(
                removed = stale.len(),
                remaining = self.entries.len(),
                "Swept expired thumbnails"
            );
        }
        stale.len()
    }

    fn is_stale(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) > self.max_age
    }

    /// Remove `key` if it is present but too old. Returns whether it was.
    fn expire_if_stale(&mut self, key: &str) -> bool {
        let now = self.clock.now();
        let stale = self
            .entries
            .peek(key)
            .is_some_and(|entry| self.is_stale(entry, now));

        if stale {
            self.entries.pop(key);
            self.stats.expirations += 1;
            trace!(key, "Thumbnail expired");
        }
        stale
    }
}

impl std::fmt::Debug for ThumbnailCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThumbnailCache")
            .field("size", &self.entries.len())
            .field("capacity", &self.capacity())
            .field("max_age", &self.max_age)
            .field("stats", &self.stats)
            .finish()
    }
}
