//! HTTP request handlers for the REST API.

pub mod chat;
pub mod files;
pub mod notes;
pub mod session;
