//! Gateway configuration
//!
//! Options are read once at startup from command-line flags or the
//! environment and are immutable afterwards.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::StartupError;

/// Default identification header sent to upstream sites
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// How a target host is compared against the allowed domain list
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DomainMatch {
    /// Host must equal an allowed domain
    Exact,
    /// Host may also be any subdomain of an allowed domain
    Suffix,
}

/// Command-line / environment arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "m3u8-gateway")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host address to bind to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Browser origins allowed to call the gateway (comma separated).
    #[arg(
        long,
        env = "ALLOWED_ORIGIN",
        value_delimiter = ',',
        default_value = "https://msv-i92p.onrender.com"
    )]
    pub allowed_origins: Vec<String>,

    /// Domains the gateway may fetch from (comma separated).
    #[arg(
        long,
        env = "ALLOWED_DOMAINS",
        value_delimiter = ',',
        default_value = "example.com,autredomaine.com"
    )]
    pub allowed_domains: Vec<String>,

    /// Domain matching policy.
    #[arg(long, env = "DOMAIN_MATCH", value_enum, default_value_t = DomainMatch::Suffix)]
    pub domain_match: DomainMatch,

    /// Timeout for upstream requests in seconds.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 10)]
    pub upstream_timeout_secs: u64,

    /// Lifetime of a cached manifest URL in seconds.
    #[arg(long, env = "CACHE_TTL_SECS", default_value_t = 3600)]
    pub cache_ttl_secs: u64,

    /// Interval between sweeps of expired cache entries in seconds (0 disables).
    #[arg(long, env = "CACHE_SWEEP_SECS", default_value_t = 300)]
    pub cache_sweep_secs: u64,

    /// User-Agent header sent upstream.
    #[arg(long, env = "UPSTREAM_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Directory holding `episodeN` asset folders.
    #[arg(long, env = "MEDIA_ROOT")]
    pub media_root: Option<PathBuf>,
}

impl Args {
    /// Convert parsed arguments into a validated server configuration.
    pub fn into_server_config(self) -> Result<ServerConfig, StartupError> {
        let config = ServerConfig {
            host: self.host,
            port: self.port,
            allowed_origins: clean_list(self.allowed_origins),
            allowed_domains: clean_list(self.allowed_domains),
            domain_match: self.domain_match,
            upstream_timeout_secs: self.upstream_timeout_secs,
            cache_ttl_secs: self.cache_ttl_secs,
            cache_sweep_secs: self.cache_sweep_secs,
            user_agent: self.user_agent,
            media_root: self.media_root,
        };
        config.validate()?;
        Ok(config)
    }
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Caller origins permitted to use the gateway
    pub allowed_origins: Vec<String>,

    /// Hostnames (or parent domains) the gateway may contact
    pub allowed_domains: Vec<String>,

    /// Domain matching policy
    pub domain_match: DomainMatch,

    /// Upstream request timeout in seconds
    pub upstream_timeout_secs: u64,

    /// Time-to-live for cached extractions in seconds
    pub cache_ttl_secs: u64,

    /// Interval of the expired-entry sweep in seconds, 0 to disable
    pub cache_sweep_secs: u64,

    /// User-Agent sent upstream
    pub user_agent: String,

    /// Root directory for episode asset folders
    pub media_root: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            allowed_origins: vec!["https://msv-i92p.onrender.com".to_string()],
            allowed_domains: vec!["example.com".to_string(), "autredomaine.com".to_string()],
            domain_match: DomainMatch::Suffix,
            upstream_timeout_secs: 10,
            cache_ttl_secs: 3600,
            cache_sweep_secs: 300,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            media_root: None,
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), StartupError> {
        if self.allowed_domains.is_empty() {
            return Err(StartupError::Config(
                "at least one allowed domain is required".to_string(),
            ));
        }

        for origin in &self.allowed_origins {
            let parsed = Url::parse(origin).map_err(|e| {
                StartupError::Config(format!("invalid allowed origin {}: {}", origin, e))
            })?;
            if parsed.host_str().is_none() || parsed.origin().ascii_serialization() != *origin {
                return Err(StartupError::Config(format!(
                    "allowed origin must be scheme://host[:port]: {}",
                    origin
                )));
            }
        }

        if self.upstream_timeout_secs == 0 {
            return Err(StartupError::Config(
                "upstream timeout must be greater than zero".to_string(),
            ));
        }
        if self.cache_ttl_secs == 0 {
            return Err(StartupError::Config(
                "cache TTL must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
