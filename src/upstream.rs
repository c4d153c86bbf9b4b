//! Outbound HTTP client shared by extraction and relay.

use reqwest::{redirect, Client};
use std::time::Duration;
use url::Url;

use crate::config::ServerConfig;
use crate::error::{GatewayError, Result, StartupError};
use crate::policy::DomainAllowlist;

const MAX_REDIRECTS: usize = 10;

/// Thin wrapper over a pooled `reqwest::Client` with a fixed user agent
/// and per-request timeout covering connect through the last body byte.
/// Upstream is contacted directly (no system proxy). No retries.
///
/// Redirects are only followed to allowlisted hosts. A redirect anywhere
/// else is not followed, and the 3xx surfaces as an upstream failure.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    inner: Client,
}

impl UpstreamClient {
    pub fn new(
        config: &ServerConfig,
        domains: DomainAllowlist,
    ) -> std::result::Result<Self, StartupError> {
        Self::build(&config.user_agent, config.upstream_timeout(), domains)
    }

    pub fn build(
        user_agent: &str,
        timeout: Duration,
        domains: DomainAllowlist,
    ) -> std::result::Result<Self, StartupError> {
        let inner = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(redirect_policy(domains))
            .no_proxy()
            .build()?;
        Ok(Self { inner })
    }

    /// Fetch a page and buffer its body as text.
    pub async fn fetch_text(&self, url: &Url) -> Result<String> {
        let res = self.open(url).await?;
        let body = res.text().await?;
        tracing::debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }

    /// Issue a GET and hand back the response for incremental consumption.
    pub async fn open_stream(&self, url: &Url) -> Result<reqwest::Response> {
        self.open(url).await
    }

    async fn open(&self, url: &Url) -> Result<reqwest::Response> {
        let res = self.inner.get(url.clone()).send().await.map_err(|e| {
            tracing::error!("Upstream request to {} failed: {}", url, e);
            GatewayError::from(e)
        })?;

        let status = res.status();
        if !status.is_success() {
            tracing::error!("Upstream {} returned {}", url, status);
            return Err(GatewayError::Upstream(format!(
                "{} returned status {}",
                url, status
            )));
        }

        Ok(res)
    }
}

fn redirect_policy(domains: DomainAllowlist) -> redirect::Policy {
    redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if domains.is_allowed(attempt.url()) {
            attempt.follow()
        } else {
            tracing::warn!("Refusing redirect to {}", attempt.url());
            attempt.stop()
        }
    })
}
