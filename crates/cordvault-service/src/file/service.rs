//! File CRUD and soft deletion.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use cordvault_core::error::AppError;
use cordvault_core::traits::blob::{BlobStore, DeleteOutcome};
use cordvault_database::repositories::{FileStore, FolderStore};
use cordvault_entity::file::{DeletionReason, File, UpdateFile};

use crate::folder::service::find_owned_folder;

/// Load an active file belonging to `owner_id`. Deleted files and files of
/// other owners are reported as missing.
pub(crate) async fn find_owned_file(
    files: &dyn FileStore,
    owner_id: Uuid,
    file_id: Uuid,
) -> Result<File, AppError> {
    files
        .find_by_id(file_id)
        .await?
        .filter(|f| f.is_active() && f.owner_id == owner_id)
        .ok_or_else(|| AppError::not_found("File not found"))
}

/// Manages file records: lookups, metadata edits, and deletion.
#[derive(Debug, Clone)]
pub struct FileService {
    /// File store.
    files: Arc<dyn FileStore>,
    /// Folder store, for ownership checks on moves.
    folders: Arc<dyn FolderStore>,
    /// Blob backend, for best-effort remote deletes.
    blobs: Arc<dyn BlobStore>,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        files: Arc<dyn FileStore>,
        folders: Arc<dyn FolderStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            files,
            folders,
            blobs,
        }
    }

    /// Gets an active file by ID.
    pub async fn get_file(&self, owner_id: Uuid, file_id: Uuid) -> Result<File, AppError> {
        find_owned_file(self.files.as_ref(), owner_id, file_id).await
    }

    /// Lists an owner's active files, newest first.
    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<File>, AppError> {
        Ok(self.files.find_active_by_owner(owner_id).await?)
    }

    /// Lists the active files of a folder, newest first.
    pub async fn list_by_folder(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
    ) -> Result<Vec<File>, AppError> {
        find_owned_folder(self.folders.as_ref(), owner_id, folder_id).await?;
        let files = self.files.find_active_by_folder(folder_id).await?;
        Ok(files.into_iter().filter(|f| f.owner_id == owner_id).collect())
    }

    /// Number of active files in a folder.
    pub async fn count_in_folder(&self, folder_id: Uuid) -> Result<u64, AppError> {
        Ok(self.files.count_active_in_folder(folder_id).await?)
    }

    /// Merges user-editable fields. The storage pointer and URL are never
    /// touched here. An empty update returns the file unchanged.
    pub async fn update_metadata(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
        mut update: UpdateFile,
    ) -> Result<File, AppError> {
        let current = self.get_file(owner_id, file_id).await?;
        if update.is_empty() {
            return Ok(current);
        }

        if let Some(name) = &update.name {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(AppError::validation("File name cannot be empty"));
            }
            update.name = Some(trimmed.to_string());
        }

        if let Some(Some(folder_id)) = update.folder_id {
            find_owned_folder(self.folders.as_ref(), owner_id, folder_id).await?;
        }

        let file = self
            .files
            .update_metadata(file_id, &update)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        info!(owner_id = %owner_id, file_id = %file_id, "File metadata updated");
        Ok(file)
    }

    /// Deletes a file.
    ///
    /// The remote delete is attempted first but its outcome never blocks
    /// the local soft delete; it only selects the recorded reason.
    pub async fn delete_file(&self, owner_id: Uuid, file_id: Uuid) -> Result<File, AppError> {
        let file = self.get_file(owner_id, file_id).await?;

        let reason = match file.blob_ref() {
            None => DeletionReason::UserDeleted,
            Some(blob_ref) => match self.blobs.delete(&blob_ref).await {
                Ok(DeleteOutcome::Removed) => DeletionReason::UserDeleted,
                Ok(DeleteOutcome::AlreadyAbsent) => DeletionReason::UserDeletedBackendAbsent,
                Ok(DeleteOutcome::Refused) => {
                    warn!(file_id = %file_id, blob = %blob_ref, "Backend refused blob delete");
                    DeletionReason::UserDeletedBackendFailed
                }
                Err(e) => {
                    warn!(
                        file_id = %file_id,
                        blob = %blob_ref,
                        error = %e,
                        "Backend blob delete failed"
                    );
                    DeletionReason::UserDeletedBackendFailed
                }
            },
        };

        if !self.files.soft_delete(file_id, reason).await? {
            return Err(AppError::not_found("File not found"));
        }

        info!(
            owner_id = %owner_id,
            file_id = %file_id,
            reason = %reason,
            "File deleted"
        );

        self.files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))
    }
}
