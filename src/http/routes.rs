//! Axum router configuration

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::policy::origin_gate;
use crate::state::AppState;

use super::episodes::serve_episode;
use super::handlers::{extract_manifest, health_check, status};
use super::relay::{relay, RELAY_PATH};

/// Value of `Access-Control-Allow-Headers` on gated routes
pub const ALLOWED_HEADERS: &str = "Origin, X-Requested-With, Content-Type, Accept";

fn allowed_headers() -> [header::HeaderName; 4] {
    [
        header::ORIGIN,
        header::HeaderName::from_static("x-requested-with"),
        header::CONTENT_TYPE,
        header::ACCEPT,
    ]
}

/// Create the Axum router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    // Extraction echoes the caller's (already gated) origin.
    let extract_cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(state.allowed_origins.header_values()))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(allowed_headers())
        .max_age(Duration::from_secs(3600));

    // Media segments are fetched directly by players, so any origin.
    let relay_cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(allowed_headers())
        .max_age(Duration::from_secs(3600));

    let gated = Router::new()
        .route("/", get(extract_manifest).layer(extract_cors))
        .route(RELAY_PATH, get(relay).layer(relay_cors))
        .layer(middleware::map_response(add_allow_headers))
        .layer(middleware::from_fn_with_state(state.clone(), origin_gate));

    Router::new()
        // Health and status endpoints
        .route("/health", get(health_check))
        .route("/status", get(status))
        // Local episode assets
        .route("/episode/{num}/{*path}", get(serve_episode))
        .merge(gated)
        // Middleware
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}

/// Advertise the accepted request headers on every gated response,
/// not only on preflights.
async fn add_allow_headers(mut response: Response) -> Response {
    response
        .headers_mut()
        .entry(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .or_insert(HeaderValue::from_static(ALLOWED_HEADERS));
    response
}
