//! Chat session lifecycle for Foxie.
//!
//! - `repository`: the `SessionStore` port the infrastructure layer implements
//! - `session`: in-memory message-sequence mutations and regeneration planning
//! - `service`: `ChatSessionService`, which ties the store and the completion
//!   provider together

pub mod repository;
pub mod service;
pub mod session;
