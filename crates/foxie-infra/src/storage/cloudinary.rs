//! Cloudinary blob store.
//!
//! Existence checks go through the Admin API (`GET .../resources/{type}/upload/{id}`,
//! HTTP basic auth). Destroys go through the signed Upload API
//! (`POST .../{type}/destroy`) with a SHA-256 request signature.
//!
//! Neither API accepts an `auto` resource type. An `auto` hint is resolved
//! by looking the blob up as image, raw, then video, and the first hit is
//! used for both the existence answer and the destroy call.
//!
//! The API key and secret are wrapped in [`SecretString`] and only exposed
//! while building a request.

use std::time::Duration;

use chrono::Utc;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use foxie_core::storage::blob_store::BlobStore;
use foxie_types::config::BlobStoreConfig;
use foxie_types::error::BlobError;
use foxie_types::note::ResourceType;

/// Account credentials for a Cloudinary cloud.
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: SecretString,
    pub api_secret: SecretString,
}

/// Cloudinary-backed implementation of `BlobStore`.
///
/// Does NOT derive Debug so credentials can never end up in logs.
pub struct CloudinaryBlobStore {
    client: reqwest::Client,
    api_base: String,
    credentials: CloudinaryCredentials,
}

/// Destroy result Cloudinary reports for a missing blob.
const NOT_FOUND: &str = "not found";

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryBlobStore {
    pub fn new(
        config: &BlobStoreConfig,
        credentials: CloudinaryCredentials,
    ) -> Result<Self, BlobError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BlobError::Upstream(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn resource_url(&self, public_id: &str, resource_type: ResourceType) -> String {
        format!(
            "{}/{}/resources/{}/upload/{}",
            self.api_base, self.credentials.cloud_name, resource_type, public_id
        )
    }

    fn destroy_url(&self, resource_type: ResourceType) -> String {
        format!(
            "{}/{}/{}/destroy",
            self.api_base, self.credentials.cloud_name, resource_type
        )
    }
}

/// Concrete resource types to try for a hint, in lookup order.
fn candidate_types(resource_type: ResourceType) -> &'static [ResourceType] {
    match resource_type {
        ResourceType::Auto => &[ResourceType::Image, ResourceType::Raw, ResourceType::Video],
        ResourceType::Image => &[ResourceType::Image],
        ResourceType::Raw => &[ResourceType::Raw],
        ResourceType::Video => &[ResourceType::Video],
    }
}

/// Sign request parameters: sorted `key=value` pairs joined by `&`, followed
/// by the API secret, hashed with SHA-256 and hex encoded.
fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{:x}", Sha256::digest(format!("{joined}{api_secret}").as_bytes()))
}

fn status_error(status: StatusCode, body: String) -> BlobError {
    match status.as_u16() {
        401 | 403 => BlobError::Auth,
        404 => BlobError::NotFound,
        _ => BlobError::Upstream(format!("HTTP {status}: {body}")),
    }
}

/// Interpret an Admin API lookup status: 404 means the blob is absent.
fn lookup_result(status: StatusCode, body: String) -> Result<bool, BlobError> {
    if status.is_success() {
        Ok(true)
    } else if status == StatusCode::NOT_FOUND {
        Ok(false)
    } else {
        Err(status_error(status, body))
    }
}

impl CloudinaryBlobStore {
    /// Admin API lookup for one concrete resource type.
    async fn lookup(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> Result<bool, BlobError> {
        let response = self
            .client
            .get(self.resource_url(public_id, resource_type))
            .basic_auth(
                self.credentials.api_key.expose_secret(),
                Some(self.credentials.api_secret.expose_secret()),
            )
            .send()
            .await
            .map_err(|e| BlobError::Upstream(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let body = if status.is_success() {
            String::new()
        } else {
            response.text().await.unwrap_or_default()
        };
        debug!(
            public_id = %public_id,
            resource_type = %resource_type,
            status = %status,
            "Blob lookup"
        );
        lookup_result(status, body)
    }

    /// The concrete resource type the blob is stored under, if it exists.
    async fn locate(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> Result<Option<ResourceType>, BlobError> {
        for &candidate in candidate_types(resource_type) {
            if self.lookup(public_id, candidate).await? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// Signed Upload API destroy for one concrete resource type.
    async fn destroy_as(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> Result<String, BlobError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", timestamp.as_str())],
            self.credentials.api_secret.expose_secret(),
        );

        let form = [
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.credentials.api_key.expose_secret()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let response = self
            .client
            .post(self.destroy_url(resource_type))
            .form(&form)
            .send()
            .await
            .map_err(|e| BlobError::Upstream(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let parsed: DestroyResponse = response
            .json()
            .await
            .map_err(|e| BlobError::Upstream(format!("failed to parse destroy response: {e}")))?;
        debug!(public_id = %public_id, result = %parsed.result, "Blob destroy");
        Ok(parsed.result)
    }
}

impl BlobStore for CloudinaryBlobStore {
    async fn exists(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> Result<bool, BlobError> {
        Ok(self.locate(public_id, resource_type).await?.is_some())
    }

    async fn destroy(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> Result<String, BlobError> {
        if resource_type != ResourceType::Auto {
            return self.destroy_as(public_id, resource_type).await;
        }
        match self.locate(public_id, resource_type).await? {
            Some(concrete) => self.destroy_as(public_id, concrete).await,
            None => Ok(NOT_FOUND.to_string()),
        }
    }
}
