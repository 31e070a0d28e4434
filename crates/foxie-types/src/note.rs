//! Note attachment types.
//!
//! A note is a document in the user's `notes` collection pointing at a file
//! uploaded to the blob store. The blob store addresses files by an opaque
//! public id plus a resource-type hint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Largest upload the file endpoints accept (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Blob store resource class. Lookups and deletes must name the right one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    #[default]
    Image,
    Raw,
    Video,
    Auto,
}

impl ResourceType {
    /// Resource class for an uploaded MIME type.
    ///
    /// PDFs and every other `application/*` type are stored as `raw`;
    /// everything else goes in as `image`.
    pub fn from_mime(file_type: &str) -> Self {
        if file_type == "application/pdf" || file_type.contains("application/") {
            ResourceType::Raw
        } else {
            ResourceType::Image
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Image => "image",
            ResourceType::Raw => "raw",
            ResourceType::Video => "video",
            ResourceType::Auto => "auto",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(ResourceType::Image),
            "raw" => Ok(ResourceType::Raw),
            "video" => Ok(ResourceType::Video),
            "auto" => Ok(ResourceType::Auto),
            other => Err(format!("invalid resource type: '{other}'")),
        }
    }
}

/// A note record pointing at an uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    #[serde(skip_serializing, default)]
    pub user_id: String,
    pub file_name: String,
    pub file_type: String,
    pub file_url: String,
    pub public_id: String,
    /// Stored hint; older notes may lack it and are treated as images.
    #[serde(default)]
    pub resource_type: Option<ResourceType>,
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Build a note for a freshly uploaded file.
    pub fn new(
        user_id: impl Into<String>,
        file_name: impl Into<String>,
        file_type: impl Into<String>,
        file_url: impl Into<String>,
        public_id: impl Into<String>,
    ) -> Self {
        let file_type = file_type.into();
        let resource_type = ResourceType::from_mime(&file_type);
        Self {
            id: Uuid::now_v7().to_string(),
            user_id: user_id.into(),
            file_name: file_name.into(),
            file_type,
            file_url: file_url.into(),
            public_id: public_id.into(),
            resource_type: Some(resource_type),
            created_at: Utc::now(),
        }
    }

    /// Resource type used when checking the blob store.
    pub fn effective_resource_type(&self) -> ResourceType {
        self.resource_type.unwrap_or(ResourceType::Image)
    }
}

/// One failed item in a sync sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncItemError {
    pub note_id: String,
    pub error: String,
}

/// Tally of a note attachment reconciliation sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub synced: u32,
    pub removed: u32,
    pub errors: Vec<SyncItemError>,
}

/// Outcome of an idempotent file delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyAbsent,
}

impl DeleteOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            DeleteOutcome::Deleted => "File deleted successfully",
            DeleteOutcome::AlreadyAbsent => "File not found, no action taken",
        }
    }
}
