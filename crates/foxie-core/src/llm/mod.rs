//! Completion provider abstractions for Foxie.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch
//! - `prompt`: fixed completion settings and request assembly

pub mod box_provider;
pub mod prompt;
pub mod provider;
