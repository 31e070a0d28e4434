//! Business logic and repository trait definitions for Foxie.
//!
//! This crate defines the "ports" (store, provider, and blob-store traits)
//! that the infrastructure layer implements, plus the services built on
//! them. It depends only on `foxie-types` -- never on `foxie-infra` or any
//! database/IO crate.

pub mod chat;
pub mod event;
pub mod llm;
pub mod notes;
pub mod storage;
