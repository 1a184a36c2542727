//! Access URL refresh.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use cordvault_core::error::AppError;
use cordvault_core::traits::blob::BlobStore;
use cordvault_database::repositories::FileStore;

/// Re-reads expiring access URLs from the backend and writes back the
/// ones that changed.
///
/// Invoked for every file on a schedule and for one owner after login.
#[derive(Debug, Clone)]
pub struct UrlRefreshService {
    /// File store.
    files: Arc<dyn FileStore>,
    /// Blob backend.
    blobs: Arc<dyn BlobStore>,
}

impl UrlRefreshService {
    /// Creates a new URL refresh service.
    pub fn new(files: Arc<dyn FileStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { files, blobs }
    }

    /// Refresh URLs of active files, optionally only `owner_id`'s.
    /// Returns how many records were rewritten.
    ///
    /// Per-file backend failures are logged and skipped.
    pub async fn refresh_urls(&self, owner_id: Option<Uuid>) -> Result<u64, AppError> {
        if !self.blobs.is_ready() {
            return Err(AppError::backend_unavailable(
                "Blob backend not ready, skipping URL refresh",
            ));
        }

        let files = self.files.find_active_with_blob(owner_id).await?;
        let total = files.len();
        let mut updated = 0u64;

        for file in files {
            let Some(blob_ref) = file.blob_ref() else {
                continue;
            };

            let url = match self.blobs.refresh_url(&blob_ref).await {
                Ok(url) => url,
                Err(e) => {
                    warn!(file_id = %file.id, blob = %blob_ref, error = %e, "URL refresh failed");
                    continue;
                }
            };

            if url == file.url {
                continue;
            }

            match self.files.update_url(file.id, &url).await {
                Ok(true) => {
                    debug!(file_id = %file.id, "Access URL refreshed");
                    updated += 1;
                }
                Ok(false) => debug!(file_id = %file.id, "File deleted during URL refresh"),
                Err(e) => warn!(file_id = %file.id, error = %e, "Failed to store refreshed URL"),
            }
        }

        info!(owner_id = ?owner_id, total, updated, "URL refresh completed");
        Ok(updated)
    }
}
