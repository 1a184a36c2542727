//! File download.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

use cordvault_core::error::AppError;
use cordvault_core::traits::blob::BlobStore;
use cordvault_database::repositories::FileStore;

use super::service::find_owned_file;

/// Bytes of a file plus what a client needs to save them.
#[derive(Debug, Clone)]
pub struct FileDownload {
    /// File content.
    pub bytes: Bytes,
    /// Name the file was uploaded with.
    pub filename: String,
    /// MIME type recorded at upload.
    pub mime_type: String,
}

/// Fetches file bytes through the stored access URL.
#[derive(Debug, Clone)]
pub struct DownloadService {
    /// File store.
    files: Arc<dyn FileStore>,
    /// Blob backend.
    blobs: Arc<dyn BlobStore>,
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(files: Arc<dyn FileStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { files, blobs }
    }

    /// Downloads a file. Backend failures are returned as-is, not retried.
    pub async fn download_file(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
    ) -> Result<FileDownload, AppError> {
        let file = find_owned_file(self.files.as_ref(), owner_id, file_id).await?;
        let bytes = self.blobs.download(&file.url).await?;

        debug!(file_id = %file_id, size = bytes.len(), "File downloaded");

        Ok(FileDownload {
            bytes,
            filename: file.original_name,
            mime_type: file.mime_type,
        })
    }
}
