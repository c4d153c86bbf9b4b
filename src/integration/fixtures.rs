//! Test fixtures for integration tests
//!
//! A local upstream site serving pages with and without manifest
//! references, binary media for the relay, redirects and a body that is
//! cut off after the headers are sent.

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures_util::stream;
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use crate::config::ServerConfig;

pub const PLAYER_PAGE: &str = r#"<html><body>
<video><source src="https://other.test/b.m3u8" type="application/x-mpegURL"></video>
<script>
  var backup = "https://third.test/c.m3u8";
  jwplayer("player").setup({ file: "https://cdn.example/a.m3u8?x=1", width: "100%" });
</script>
</body></html>"#;

pub const SOURCE_PAGE: &str =
    r#"<html><body><video><source src='https://v.test/hls/index.m3u8?t=5'></video></body></html>"#;

pub const TRUNCATED_LENGTH: u64 = 1_000_000;

pub const PLAIN_PAGE: &str = "<html><body><p>Nothing to see here.</p></body></html>";

/// Deterministic binary payload larger than a single read chunk
pub fn segment_bytes() -> Vec<u8> {
    (0..300_000u32).map(|i| (i % 251) as u8).collect()
}

/// Local upstream HTTP server with per-path request counting
pub struct TestUpstream {
    base_url: String,
    request_counts: Arc<Mutex<HashMap<String, usize>>>,
}

impl TestUpstream {
    pub async fn new() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://127.0.0.1:{}", addr.port());
        // Same server under a hostname that is not on the test allowlist.
        let offsite = format!("http://localhost:{}/secret", addr.port());
        let onsite = format!("{}/segment.ts", base_url);

        let request_counts = Arc::new(Mutex::new(HashMap::new()));
        let request_counts_clone = request_counts.clone();
        let version = Arc::new(AtomicUsize::new(0));

        let app = Router::new()
            .route("/player", get(|| async { PLAYER_PAGE }))
            .route("/source", get(|| async { SOURCE_PAGE }))
            .route("/plain", get(|| async { PLAIN_PAGE }))
            .route(
                "/error",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream broke") }),
            )
            .route(
                "/changing",
                get(move || {
                    let n = version.fetch_add(1, Ordering::SeqCst);
                    async move { format!(r#"{{ file: "https://cdn.example/v{}.m3u8" }}"#, n) }
                }),
            )
            .route(
                "/segment.ts",
                get(|| async { ([(header::CONTENT_TYPE, "video/mp2t")], segment_bytes()) }),
            )
            .route("/untyped", get(untyped))
            .route("/hop", get(move || redirect(offsite.clone())))
            .route("/hop-local", get(move || redirect(onsite.clone())))
            .route("/secret", get(|| async { "internal-only body" }))
            .route("/truncated", get(truncated))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    PLAYER_PAGE
                }),
            )
            .layer(axum::middleware::from_fn(
                move |req: axum::extract::Request, next: axum::middleware::Next| {
                    let counts = request_counts_clone.clone();
                    async move {
                        let path = req.uri().path().to_string();
                        if let Ok(mut counts) = counts.lock() {
                            *counts.entry(path).or_insert(0) += 1;
                        }
                        next.run(req).await
                    }
                },
            ));

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            request_counts,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn request_count(&self, path: &str) -> usize {
        self.request_counts
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_requests(&self) -> usize {
        self.request_counts.lock().unwrap().values().sum()
    }
}

/// Response without a Content-Type header
async fn untyped() -> Response {
    let mut response = Body::from(vec![1u8, 2, 3, 4, 5]).into_response();
    response.headers_mut().remove(header::CONTENT_TYPE);
    response
}

async fn redirect(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Advertises `TRUNCATED_LENGTH` bytes, sends one chunk, then aborts
async fn truncated() -> Response {
    let chunks = stream::unfold(0u8, |step| async move {
        match step {
            0 => Some((Ok::<Vec<u8>, io::Error>(vec![7u8; 4096]), 1)),
            1 => {
                tokio::time::sleep(Duration::from_millis(100)).await;
                let err = io::Error::new(io::ErrorKind::ConnectionReset, "cut off");
                Some((Err(err), 2))
            }
            _ => None,
        }
    });
    let mut response = Body::from_stream(chunks).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, "video/mp2t".parse().unwrap());
    headers.insert(header::CONTENT_LENGTH, TRUNCATED_LENGTH.into());
    response
}

/// Gateway configuration that allows the local upstream
pub fn gateway_config() -> ServerConfig {
    ServerConfig {
        allowed_origins: vec!["https://app.test".to_string()],
        allowed_domains: vec!["127.0.0.1".to_string()],
        ..Default::default()
    }
}

/// Build a gateway request path with the target url-encoded
pub fn gateway_uri(path: &str, target: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("{}?url={}", path, encoded)
}
