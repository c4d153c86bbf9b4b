//! HTTP request handlers
//!
//! Extraction endpoint plus health and status.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{GatewayError, Result};
use crate::state::AppState;

/// `?url=` query shared by `/` and `/proxy`
#[derive(Debug, Deserialize)]
pub struct TargetQuery {
    pub url: Option<String>,
}

impl TargetQuery {
    /// The raw target, or `InvalidRequest` when missing or blank.
    pub fn require(&self) -> Result<&str> {
        match self.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(GatewayError::InvalidRequest(
                "missing ?url= parameter".to_string(),
            )),
        }
    }
}

/// Successful extraction body
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestResponse {
    pub m3u8: String,
    pub cached: bool,
}

/// `GET /?url=` resolve a page to its manifest URL
pub async fn extract_manifest(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TargetQuery>,
) -> Result<Json<ManifestResponse>> {
    let raw = query.require()?;
    let target = state.domains.check(raw).inspect_err(|e| {
        if matches!(e, GatewayError::DomainRejected(_)) {
            tracing::warn!("Refusing extraction for {}: {}", raw, e);
            state.stats.record_rejected();
        }
    })?;

    match state.resolver.resolve(raw, &target).await {
        Ok(resolved) => {
            if resolved.cached {
                state.stats.record_hit();
            } else {
                state.stats.record_miss();
            }
            tracing::info!(
                "Resolved {} -> {} (cached: {})",
                raw,
                resolved.url,
                resolved.cached
            );
            Ok(Json(ManifestResponse {
                m3u8: resolved.url,
                cached: resolved.cached,
            }))
        }
        Err(e) => {
            state.stats.record_failure();
            tracing::warn!("Extraction failed for {}: {}", raw, e);
            Err(e)
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Status line endpoint
pub async fn status(State(state): State<Arc<AppState>>) -> String {
    state.status_line()
}
