//! Shared domain types for Foxie.
//!
//! This crate contains the core domain types used across the Foxie backend:
//! chat sessions and messages, note attachments, completion requests, global
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod llm;
pub mod note;
