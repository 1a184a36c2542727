//! Single-request file upload.

use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use cordvault_core::config::StorageConfig;
use cordvault_core::error::AppError;
use cordvault_core::traits::blob::BlobStore;
use cordvault_database::repositories::{FileStore, FolderStore};
use cordvault_entity::file::{CreateFile, File, extension_of, raw_extension};
use cordvault_entity::storage::StorageProviderType;

use crate::folder::service::find_owned_folder;

/// An upload as delivered by the transport layer.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// File content.
    pub content: Bytes,
    /// Name as uploaded.
    pub original_name: String,
    /// MIME type as reported by the client.
    pub mime_type: String,
    /// Caller-declared storage name.
    pub name: Option<String>,
    /// Target folder.
    pub folder_id: Option<Uuid>,
    /// Optional description.
    pub description: Option<String>,
}

impl UploadRequest {
    /// Upload of `content` named `original_name`, with no folder.
    pub fn new(
        content: impl Into<Bytes>,
        original_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            original_name: original_name.into(),
            mime_type: mime_type.into(),
            name: None,
            folder_id: None,
            description: None,
        }
    }

    /// Place the upload in a folder.
    pub fn in_folder(mut self, folder_id: Uuid) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    /// Use a declared storage name instead of a generated one.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Generate a unique storage name that keeps the original extension as
/// written.
pub fn generate_storage_name(original_name: &str) -> String {
    format!("{}{}", Uuid::new_v4(), raw_extension(original_name))
}

/// Validates uploads, writes the blob, then records the file.
#[derive(Debug, Clone)]
pub struct UploadService {
    /// File store.
    files: Arc<dyn FileStore>,
    /// Folder store.
    folders: Arc<dyn FolderStore>,
    /// Blob backend.
    blobs: Arc<dyn BlobStore>,
    /// Upload limits.
    config: StorageConfig,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        files: Arc<dyn FileStore>,
        folders: Arc<dyn FolderStore>,
        blobs: Arc<dyn BlobStore>,
        config: StorageConfig,
    ) -> Self {
        Self {
            files,
            folders,
            blobs,
            config,
        }
    }

    fn validate(&self, req: &UploadRequest) -> Result<(), AppError> {
        if req.original_name.trim().is_empty() {
            return Err(AppError::validation("File name cannot be empty"));
        }
        if req.content.len() as u64 > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }
        if !self.config.is_mime_allowed(&req.mime_type) {
            return Err(AppError::validation(format!(
                "File type '{}' is not allowed",
                req.mime_type
            )));
        }
        Ok(())
    }

    /// Uploads a file.
    ///
    /// No record is written unless the blob write succeeds. Backend
    /// failures surface with their backend error kind.
    pub async fn upload_file(&self, owner_id: Uuid, req: UploadRequest) -> Result<File, AppError> {
        self.validate(&req)?;

        if let Some(folder_id) = req.folder_id {
            find_owned_folder(self.folders.as_ref(), owner_id, folder_id).await?;
        }

        let name = match req.name.as_deref().map(str::trim) {
            Some(declared) if !declared.is_empty() => declared.to_string(),
            _ => generate_storage_name(&req.original_name),
        };
        let storage_provider = StorageProviderType::from_str(self.blobs.provider_type())
            .map_err(|e| AppError::internal(e.message))?;

        let stored = self
            .blobs
            .put(req.content, &name, &req.original_name)
            .await?;

        let record = CreateFile {
            file_type: extension_of(&req.original_name),
            name,
            original_name: req.original_name,
            owner_id,
            folder_id: req.folder_id,
            size_bytes: stored.size_bytes as i64,
            mime_type: req.mime_type,
            description: req.description,
            storage_provider,
            blob_ref: stored.blob_ref.clone(),
            url: stored.access_url,
        };

        let file = match self.files.create(&record).await {
            Ok(file) => file,
            Err(e) => {
                if let Err(cleanup) = self.blobs.delete(&stored.blob_ref).await {
                    warn!(
                        blob = %stored.blob_ref,
                        error = %cleanup,
                        "Failed to remove blob after metadata write failed"
                    );
                }
                return Err(e);
            }
        };

        info!(
            owner_id = %owner_id,
            file_id = %file.id,
            name = %file.name,
            size = file.size_bytes,
            "Upload completed"
        );

        Ok(file)
    }
}
