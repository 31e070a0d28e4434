//! External blob store implementations.
//!
//! Implements the `BlobStore` trait from `foxie-core` against Cloudinary.

pub mod cloudinary;

use foxie_core::storage::blob_store::BlobStore;
use foxie_types::error::BlobError;
use foxie_types::note::ResourceType;

/// Stand-in used when Cloudinary credentials are missing. Every call fails
/// with `BlobError::Auth`.
pub struct UnconfiguredBlobStore;

impl BlobStore for UnconfiguredBlobStore {
    async fn exists(
        &self,
        _public_id: &str,
        _resource_type: ResourceType,
    ) -> Result<bool, BlobError> {
        Err(BlobError::Auth)
    }

    async fn destroy(
        &self,
        _public_id: &str,
        _resource_type: ResourceType,
    ) -> Result<String, BlobError> {
        Err(BlobError::Auth)
    }
}
