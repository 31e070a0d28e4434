//! Note service: note records, file deletion, and the attachment sweep.
//!
//! A note is only a pointer to a blob. Blobs can disappear behind the
//! note's back (deleted from another device, expired), so
//! `sync_attachments` reconciles the two on demand and reports each
//! failure per item instead of aborting the whole sweep.

use foxie_types::error::{BlobError, NoteError};
use foxie_types::note::{
    DeleteOutcome, MAX_FILE_SIZE, Note, ResourceType, SyncItemError, SyncReport,
};
use tracing::{debug, info, warn};

use crate::notes::repository::NoteRepository;
use crate::storage::blob_store::{BlobStore, DESTROY_OK};

/// Fields of a freshly uploaded file.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub file_name: String,
    pub file_type: String,
    pub file_url: String,
    pub public_id: String,
    /// Overrides the type derived from `file_type` when the uploader knows
    /// better.
    pub resource_type: Option<ResourceType>,
}

/// Orchestrates note records against the external blob store.
pub struct NoteService<N: NoteRepository, B: BlobStore> {
    notes: N,
    blobs: B,
}

impl<N: NoteRepository, B: BlobStore> NoteService<N, B> {
    pub fn new(notes: N, blobs: B) -> Self {
        Self { notes, blobs }
    }

    /// Access the note repository.
    pub fn notes(&self) -> &N {
        &self.notes
    }

    /// List the user's notes, newest first.
    pub async fn list_notes(&self, user_id: &str) -> Result<Vec<Note>, NoteError> {
        require("userId", user_id)?;
        Ok(self.notes.list_notes(user_id).await?)
    }

    /// Record an uploaded file as a note.
    pub async fn add_note(&self, user_id: &str, new: NewNote) -> Result<Note, NoteError> {
        require("userId", user_id)?;
        require("fileName", &new.file_name)?;
        require("fileUrl", &new.file_url)?;
        require("publicId", &new.public_id)?;

        let mut note = Note::new(
            user_id,
            new.file_name,
            new.file_type,
            new.file_url,
            new.public_id,
        );
        if let Some(resource_type) = new.resource_type {
            note.resource_type = Some(resource_type);
        }

        let created = self.notes.create_note(&note).await?;
        info!(user_id = %user_id, note_id = %created.id, "Note added");
        Ok(created)
    }

    /// Destroy a blob. A blob that is already gone counts as success.
    ///
    /// `file_size`, when the caller knows it, must not exceed
    /// [`MAX_FILE_SIZE`].
    pub async fn delete_file(
        &self,
        public_id: &str,
        resource_type: ResourceType,
        file_size: Option<u64>,
    ) -> Result<DeleteOutcome, NoteError> {
        require("publicId", public_id)?;
        if let Some(size) = file_size.filter(|size| *size > MAX_FILE_SIZE) {
            return Err(NoteError::Validation(format!(
                "file size {size} exceeds the {MAX_FILE_SIZE} byte limit"
            )));
        }

        if !self.blobs.exists(public_id, resource_type).await? {
            info!(public_id = %public_id, "File already absent");
            return Ok(DeleteOutcome::AlreadyAbsent);
        }

        let result = self.blobs.destroy(public_id, resource_type).await?;
        if result != DESTROY_OK {
            warn!(public_id = %public_id, result = %result, "Blob destroy rejected");
            return Err(NoteError::Upstream(format!(
                "failed to delete file: {result}"
            )));
        }

        info!(public_id = %public_id, resource_type = %resource_type, "File deleted");
        Ok(DeleteOutcome::Deleted)
    }

    /// Remove note records whose blob no longer exists.
    pub async fn sync_attachments(&self, user_id: &str) -> Result<SyncReport, NoteError> {
        require("userId", user_id)?;

        let notes = self.notes.list_notes(user_id).await?;
        let mut report = SyncReport::default();

        for note in &notes {
            match self.reconcile(note).await {
                Ok(true) => report.synced += 1,
                Ok(false) => report.removed += 1,
                Err(e) => {
                    warn!(note_id = %note.id, error = %e, "Note sync failed");
                    report.errors.push(SyncItemError {
                        note_id: note.id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            user_id = %user_id,
            synced = report.synced,
            removed = report.removed,
            errors = report.errors.len(),
            "Attachment sync finished"
        );
        Ok(report)
    }

    /// `Ok(true)` when the blob is present, `Ok(false)` when the note was
    /// removed because it is not.
    async fn reconcile(&self, note: &Note) -> Result<bool, NoteError> {
        let present = match self
            .blobs
            .exists(&note.public_id, note.effective_resource_type())
            .await
        {
            Ok(present) => present,
            Err(BlobError::NotFound) => false,
            Err(e) => return Err(e.into()),
        };
        if present {
            return Ok(true);
        }

        self.notes.delete_note(&note.user_id, &note.id).await?;
        debug!(note_id = %note.id, public_id = %note.public_id, "Removed note with missing file");
        Ok(false)
    }
}

fn require(field: &str, value: &str) -> Result<(), NoteError> {
    if value.trim().is_empty() {
        return Err(NoteError::Validation(format!("{field} is required")));
    }
    Ok(())
}
