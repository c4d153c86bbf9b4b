//! Manifest extraction
//!
//! Fetches a page and scans it with an ordered chain of patterns.

pub mod engine;
pub mod patterns;

pub use engine::Extractor;
