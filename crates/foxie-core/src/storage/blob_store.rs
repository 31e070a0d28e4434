//! Blob store trait.
//!
//! Uploaded note files live in an external blob store addressed by an
//! opaque public id plus a resource-type hint. The core only needs to ask
//! whether a blob is still there and to destroy it.
//! Implementations live in foxie-infra (e.g., `CloudinaryBlobStore`).

use std::future::Future;
use std::pin::Pin;

use foxie_types::error::BlobError;
use foxie_types::note::ResourceType;

/// Result string the blob store reports for a successful destroy.
pub const DESTROY_OK: &str = "ok";

/// Trait for the external file store.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait BlobStore: Send + Sync {
    /// Whether a blob with this id exists. A missing blob is `Ok(false)`,
    /// never an error.
    fn exists(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> impl Future<Output = Result<bool, BlobError>> + Send;

    /// Destroy a blob, returning the store's result string (`"ok"` on
    /// success, e.g. `"not found"` otherwise).
    fn destroy(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> impl Future<Output = Result<String, BlobError>> + Send;
}

type BlobFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BlobError>> + Send + 'a>>;

/// Object-safe version of [`BlobStore`] with boxed futures.
pub trait BlobStoreDyn: Send + Sync {
    fn exists_boxed<'a>(&'a self, public_id: &'a str, resource_type: ResourceType)
    -> BlobFuture<'a, bool>;

    fn destroy_boxed<'a>(
        &'a self,
        public_id: &'a str,
        resource_type: ResourceType,
    ) -> BlobFuture<'a, String>;
}

impl<T: BlobStore> BlobStoreDyn for T {
    fn exists_boxed<'a>(
        &'a self,
        public_id: &'a str,
        resource_type: ResourceType,
    ) -> BlobFuture<'a, bool> {
        Box::pin(self.exists(public_id, resource_type))
    }

    fn destroy_boxed<'a>(
        &'a self,
        public_id: &'a str,
        resource_type: ResourceType,
    ) -> BlobFuture<'a, String> {
        Box::pin(self.destroy(public_id, resource_type))
    }
}

/// Type-erased blob store so the API layer can pick the backend at startup.
pub struct BoxBlobStore {
    inner: Box<dyn BlobStoreDyn>,
}

impl BoxBlobStore {
    pub fn new<T: BlobStore + 'static>(store: T) -> Self {
        Self {
            inner: Box::new(store),
        }
    }
}

impl BlobStore for BoxBlobStore {
    async fn exists(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> Result<bool, BlobError> {
        self.inner.exists_boxed(public_id, resource_type).await
    }

    async fn destroy(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> Result<String, BlobError> {
        self.inner.destroy_boxed(public_id, resource_type).await
    }
}
