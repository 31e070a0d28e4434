//! External blob store abstraction.

pub mod blob_store;
