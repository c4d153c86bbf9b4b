//! HTTP server module
//!
//! This module handles HTTP request routing and handling:
//! - Axum router with the gateway endpoints
//! - Manifest extraction handler (`/`)
//! - Streaming relay (`/proxy`)
//! - Health and status endpoints
//! - Episode asset folders
//! - CORS and origin gating

pub mod episodes;
pub mod handlers;
pub mod relay;
pub mod routes;

pub use routes::create_router;
