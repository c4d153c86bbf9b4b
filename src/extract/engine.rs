use url::Url;

use super::patterns::{first_match, ManifestPattern};
use crate::error::Result;
use crate::upstream::UpstreamClient;

/// A manifest URL found in a page, with the pattern that found it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub url: String,
    pub pattern: ManifestPattern,
}

/// Scan page markup for a manifest URL.
pub fn scan(body: &str) -> Option<Extraction> {
    first_match(body).map(|(pattern, url)| Extraction {
        url: url.to_string(),
        pattern,
    })
}

/// Fetches target pages and extracts their manifest URL
#[derive(Clone, Debug)]
pub struct Extractor {
    client: UpstreamClient,
}

impl Extractor {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    /// Fetch `url` once and scan it.
    ///
    /// `Ok(None)` means the page was fetched but references no manifest.
    pub async fn extract(&self, url: &Url) -> Result<Option<Extraction>> {
        let body = self.client.fetch_text(url).await?;
        let found = scan(&body);
        match &found {
            Some(e) => tracing::debug!("Matched {} in {} via {}", e.url, url, e.pattern),
            None => tracing::info!("No manifest reference in {}", url),
        }
        Ok(found)
    }
}
