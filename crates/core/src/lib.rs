//! Shared domain types for the storydeck backend.
//!
//! This crate is dependency-light on purpose: it holds the error taxonomy,
//! ID/timestamp aliases, cache-key builders, the list-sort whitelist, and
//! the dominant-color extractor. Everything here is usable from any layer
//! without pulling in sqlx, axum, or the gateway SDKs.

pub mod cache_keys;
pub mod color;
pub mod error;
pub mod listing;
pub mod types;
