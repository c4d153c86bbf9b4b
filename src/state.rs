//! Application state management
//!
//! This module defines the AppState structure that holds:
//! - Server configuration
//! - Origin and domain allowlists
//! - Manifest resolver (cache + extraction engine)
//! - Shared upstream client for the relay
//! - Request counters

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::cache::{ManifestCache, ManifestResolver, MemoryCache};
use crate::config::ServerConfig;
use crate::error::StartupError;
use crate::extract::Extractor;
use crate::policy::{AllowedOrigins, DomainAllowlist};
use crate::upstream::UpstreamClient;

/// Request counters reported by `/status`
#[derive(Debug, Default)]
pub struct GatewayStats {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    extraction_failures: AtomicU64,
    relays: AtomicU64,
    rejected: AtomicU64,
}

impl GatewayStats {
    pub fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.extraction_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_relay(&self) {
        self.relays.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
            relays: self.relays.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`GatewayStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub extraction_failures: u64,
    pub relays: u64,
    pub rejected: u64,
}

/// Application state shared across all handlers
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,

    /// Browser origins allowed through the gate
    pub allowed_origins: AllowedOrigins,

    /// Hosts the gateway may contact
    pub domains: DomainAllowlist,

    /// Cached manifest extraction
    pub resolver: ManifestResolver,

    /// Client used by the relay
    pub upstream: UpstreamClient,

    pub stats: GatewayStats,

    pub started_at: DateTime<Utc>,
    started: Instant,
}

impl AppState {
    /// Create a new AppState with the default in-memory cache
    pub fn new(config: ServerConfig) -> Result<Self, StartupError> {
        let cache: Arc<dyn ManifestCache> = Arc::new(MemoryCache::new(config.cache_ttl()));
        Self::with_cache(config, cache)
    }

    /// Create a new AppState around a caller-provided cache
    pub fn with_cache(
        config: ServerConfig,
        cache: Arc<dyn ManifestCache>,
    ) -> Result<Self, StartupError> {
        let domains = DomainAllowlist::new(&config.allowed_domains, config.domain_match);
        let upstream = UpstreamClient::new(&config, domains.clone())?;
        let resolver = ManifestResolver::new(cache, Extractor::new(upstream.clone()));

        Ok(Self {
            allowed_origins: AllowedOrigins::new(&config.allowed_origins),
            domains,
            resolver,
            upstream,
            stats: GatewayStats::default(),
            started_at: Utc::now(),
            started: Instant::now(),
            config,
        })
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Remove expired cache entries
    /// Returns number of removed entries
    pub fn sweep_cache(&self) -> usize {
        self.resolver.cache().sweep_expired()
    }

    /// One-line human readable status
    pub fn status_line(&self) -> String {
        let s = self.stats.snapshot();
        format!(
            "{} v{} up {}s since {} | cache entries={} hits={} misses={} failures={} relays={} rejected={}",
            crate::APP_NAME,
            crate::VERSION,
            self.uptime_secs(),
            self.started_at.to_rfc3339(),
            self.resolver.cache().len(),
            s.cache_hits,
            s.cache_misses,
            s.extraction_failures,
            s.relays,
            s.rejected,
        )
    }
}
