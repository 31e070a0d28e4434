//! Note attachments: records in the document store pointing at files in
//! the blob store, plus the reconciliation sweep between the two.

pub mod repository;
pub mod service;
