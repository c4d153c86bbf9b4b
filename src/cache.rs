//! Freshness cache for extracted manifest URLs
//!
//! Successful extractions are memoized per target URL for a fixed TTL.
//! Staleness is checked when an entry is read; a periodic sweep only
//! reclaims memory. Failures are never stored.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

use crate::error::{GatewayError, Result};
use crate::extract::Extractor;

/// Cache entry with metadata
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub extracted_url: String,
    pub created_at: Instant,
}

impl CacheEntry {
    pub fn new(extracted_url: String) -> Self {
        Self {
            extracted_url,
            created_at: Instant::now(),
        }
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() < ttl
    }
}

/// Storage seam for extraction results.
///
/// Implementations must replace entries as whole records; concurrent
/// writers to the same key resolve as last-writer-wins.
pub trait ManifestCache: Send + Sync {
    /// Fresh value for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous entry.
    fn put(&self, key: &str, value: String);

    /// Number of stored entries, fresh or not.
    fn len(&self) -> usize;

    /// Drop expired entries, returning how many were removed.
    fn sweep_expired(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory cache backed by a concurrent map
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }
}

impl ManifestCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let entry = self.entries.get(key)?;
        if entry.is_fresh(self.ttl) {
            Some(entry.extracted_url.clone())
        } else {
            None
        }
    }

    fn put(&self, key: &str, value: String) {
        self.entries.insert(key.to_string(), CacheEntry::new(value));
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn sweep_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(self.ttl));
        before.saturating_sub(self.entries.len())
    }
}

/// Result of a manifest lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub url: String,
    pub cached: bool,
}

/// Extraction engine fronted by a [`ManifestCache`]
#[derive(Clone)]
pub struct ManifestResolver {
    cache: Arc<dyn ManifestCache>,
    extractor: Extractor,
}

impl ManifestResolver {
    pub fn new(cache: Arc<dyn ManifestCache>, extractor: Extractor) -> Self {
        Self { cache, extractor }
    }

    pub fn cache(&self) -> &Arc<dyn ManifestCache> {
        &self.cache
    }

    /// Look up `key` and fall back to extracting from `url` on a miss.
    ///
    /// Concurrent misses for the same key each fetch; there is no
    /// request coalescing.
    pub async fn resolve(&self, key: &str, url: &Url) -> Result<Resolved> {
        if let Some(hit) = self.cache.get(key) {
            tracing::debug!("Cache hit for {}", key);
            return Ok(Resolved {
                url: hit,
                cached: true,
            });
        }

        tracing::debug!("Cache miss for {}", key);
        match self.extractor.extract(url).await? {
            Some(found) => {
                self.cache.put(key, found.url.clone());
                Ok(Resolved {
                    url: found.url,
                    cached: false,
                })
            }
            None => Err(GatewayError::NotFound(url.to_string())),
        }
    }
}
