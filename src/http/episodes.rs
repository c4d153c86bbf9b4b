//! Static episode assets (thumbnails, VTT files) from `<media_root>/episodeN/`.

use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower::util::ServiceExt;
use tower_http::services::ServeDir;

use crate::error::GatewayError;
use crate::state::AppState;

/// `GET /episode/{num}/{*path}`
pub async fn serve_episode(
    State(state): State<Arc<AppState>>,
    Path((num, _path)): Path<(String, String)>,
    mut request: Request,
) -> Response {
    let Some(root) = state.config.media_root.as_ref() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if num.is_empty() || !num.bytes().all(|b| b.is_ascii_digit()) {
        return GatewayError::InvalidRequest(format!("invalid episode number: {}", num))
            .into_response();
    }

    // Keep the still-encoded remainder of the path for ServeDir.
    let prefix = format!("/episode/{}", num);
    let rest = request
        .uri()
        .path()
        .strip_prefix(&prefix)
        .unwrap_or("/")
        .to_string();
    let Ok(uri) = rest.parse::<Uri>() else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    *request.uri_mut() = uri;

    let dir = root.join(format!("episode{}", num));
    tracing::debug!("Serving {} from {}", rest, dir.display());

    match ServeDir::new(dir).oneshot(request).await {
        Ok(res) => res.map(Body::new),
        Err(never) => match never {},
    }
}
