//! Infrastructure layer for Foxie.
//!
//! Contains implementations of the traits defined in `foxie-core`: SQLite
//! session and note stores, the OpenAI-compatible completion provider, and
//! the Cloudinary blob store. Also loads `foxie.toml` and environment
//! secrets.

pub mod config;
pub mod llm;
pub mod sqlite;
pub mod storage;
