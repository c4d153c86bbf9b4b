//! Caller origin gate.
//!
//! Runs ahead of every gated route. Requests without an `Origin` header
//! (curl, server-side tooling) pass; browser requests must come from an
//! allowed origin or are answered with 403 before any upstream I/O.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::GatewayError;
use crate::http::relay::RELAY_PATH;
use crate::state::AppState;

/// Immutable set of browser origins allowed to use the gateway
#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins {
    origins: HashSet<String>,
}

impl AllowedOrigins {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            origins: origins
                .into_iter()
                .map(|o| o.as_ref().trim().trim_end_matches('/').to_string())
                .filter(|o| !o.is_empty())
                .collect(),
        }
    }

    /// Absent origins are always permitted.
    pub fn permits(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(origin) => self.origins.contains(origin),
        }
    }

    /// Header values for the CORS layer to echo back.
    pub fn header_values(&self) -> Vec<HeaderValue> {
        self.origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect()
    }
}

/// Middleware rejecting requests from origins outside the allowlist
pub async fn origin_gate(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = match request.headers().get(header::ORIGIN) {
        None => None,
        Some(value) => match value.to_str() {
            Ok(s) => Some(s.to_string()),
            Err(_) => {
                state.stats.record_rejected();
                let error = GatewayError::OriginRejected("<non-ascii origin>".to_string());
                return reject(request.uri().path(), error);
            }
        },
    };

    if !state.allowed_origins.permits(origin.as_deref()) {
        let origin = origin.unwrap_or_default();
        tracing::warn!(
            "Rejected {} {} from origin {}",
            request.method(),
            request.uri().path(),
            origin
        );
        state.stats.record_rejected();
        return reject(request.uri().path(), GatewayError::OriginRejected(origin));
    }

    next.run(request).await
}

/// Render a rejection in the same format as the route's own errors.
fn reject(path: &str, error: GatewayError) -> Response {
    if path == RELAY_PATH {
        error.into_plain_response()
    } else {
        error.into_response()
    }
}
