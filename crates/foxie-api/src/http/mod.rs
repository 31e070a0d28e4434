//! HTTP/REST API layer for Foxie.
//!
//! Axum-based REST API at `/api/` with plain JSON bodies and CORS support.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
