//! Streaming relay for allowlisted media.
//!
//! The upstream body is forwarded chunk by chunk as it arrives. Dropping
//! the response (client went away) drops the upstream stream with it.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use futures_util::TryStreamExt;
use std::sync::Arc;

use super::handlers::TargetQuery;
use crate::error::{GatewayError, Result};
use crate::state::AppState;

/// Content type used when upstream does not send one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Route the relay is mounted on. Errors here are plain text.
pub const RELAY_PATH: &str = "/proxy";

/// `GET /proxy?url=` relay an allowlisted resource
pub async fn relay(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TargetQuery>,
) -> Response {
    match open_relay(&state, &query).await {
        Ok(response) => response,
        Err(e) => {
            if matches!(e, GatewayError::DomainRejected(_)) {
                state.stats.record_rejected();
            }
            tracing::warn!("Relay refused for {:?}: {}", query.url, e);
            e.into_plain_response()
        }
    }
}

async fn open_relay(state: &AppState, query: &TargetQuery) -> Result<Response> {
    let raw = query.require()?;
    let target = state.domains.check(raw)?;

    let res = state.upstream.open_stream(&target).await?;
    state.stats.record_relay();
    tracing::info!("Relaying {} ({})", target, res.status());

    let content_type = res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    let content_length = res.headers().get(reqwest::header::CONTENT_LENGTH).cloned();

    let url = target.to_string();
    let stream = res
        .bytes_stream()
        .inspect_err(move |e| tracing::warn!("Relay of {} aborted mid-stream: {}", url, e));

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type);
    if let Some(len) = content_length {
        response = response.header(header::CONTENT_LENGTH, len);
    }

    response
        .body(Body::from_stream(stream))
        .map_err(|e| GatewayError::Upstream(format!("response building error: {}", e)))
}
