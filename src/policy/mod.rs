//! Access policy
//!
//! - Origin gate: which browser origins may call the gateway
//! - Domain allowlist: which hosts the gateway may contact

pub mod domain;
pub mod origin;

pub use domain::DomainAllowlist;
pub use origin::{origin_gate, AllowedOrigins};
