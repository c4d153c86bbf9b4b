//! Target URL allowlist.

use url::Url;

use crate::config::DomainMatch;
use crate::error::{GatewayError, Result};

/// Set of hostnames the gateway is permitted to contact
#[derive(Debug, Clone)]
pub struct DomainAllowlist {
    domains: Vec<String>,
    policy: DomainMatch,
}

impl DomainAllowlist {
    pub fn new<I, S>(domains: I, policy: DomainMatch) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|d| normalize_host(d.as_ref()))
            .filter(|d| !d.is_empty())
            .collect();
        Self { domains, policy }
    }

    /// Parse a caller-supplied target as an absolute http(s) URL.
    pub fn parse_target(raw: &str) -> Result<Url> {
        let url = Url::parse(raw.trim())
            .map_err(|e| GatewayError::InvalidRequest(format!("invalid url {:?}: {}", raw, e)))?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(GatewayError::InvalidRequest(format!(
                    "unsupported url scheme: {}",
                    other
                )))
            }
        }
        if url.host_str().is_none() {
            return Err(GatewayError::InvalidRequest(format!(
                "url has no host: {}",
                raw
            )));
        }

        Ok(url)
    }

    /// Test a parsed URL's host against the allowlist.
    pub fn is_allowed(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = normalize_host(host);

        self.domains.iter().any(|domain| match self.policy {
            DomainMatch::Exact => host == *domain,
            DomainMatch::Suffix => {
                host == *domain
                    || host
                        .strip_suffix(domain.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            }
        })
    }

    /// Parse and check a target in one step.
    pub fn check(&self, raw: &str) -> Result<Url> {
        let url = Self::parse_target(raw)?;
        if !self.is_allowed(&url) {
            return Err(GatewayError::DomainRejected(
                url.host_str().unwrap_or_default().to_string(),
            ));
        }
        Ok(url)
    }
}

fn normalize_host(host: &str) -> String {
    host.trim()
        .trim_start_matches('.')
        .trim_end_matches('.')
        .to_ascii_lowercase()
}
