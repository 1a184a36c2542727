//! Orphan detection.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use cordvault_core::error::AppError;
use cordvault_core::traits::blob::BlobStore;
use cordvault_database::repositories::FileStore;
use cordvault_entity::file::DeletionReason;

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanReport {
    /// Files examined.
    pub checked: u64,
    /// Files whose blob is definitively gone.
    pub orphaned: u64,
    /// Orphans soft-deleted by this pass.
    pub cleaned: u64,
}

/// Soft-deletes files whose backend object no longer exists.
#[derive(Debug, Clone)]
pub struct OrphanReconciler {
    /// File store.
    files: Arc<dyn FileStore>,
    /// Blob backend.
    blobs: Arc<dyn BlobStore>,
}

impl OrphanReconciler {
    /// Creates a new orphan reconciler.
    pub fn new(files: Arc<dyn FileStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { files, blobs }
    }

    /// Check every active file with a blob reference.
    ///
    /// Only a definitive "not found" marks a file orphaned; a failed
    /// existence check leaves the file alone. An unready backend fails
    /// the whole pass so nothing is misread as missing.
    pub async fn reconcile(&self) -> Result<OrphanReport, AppError> {
        if !self.blobs.is_ready() {
            return Err(AppError::backend_unavailable(
                "Blob backend not ready, skipping orphan reconciliation",
            ));
        }

        let files = self.files.find_active_with_blob(None).await?;
        let mut report = OrphanReport::default();

        for file in files {
            let Some(blob_ref) = file.blob_ref() else {
                continue;
            };
            report.checked += 1;

            match self.blobs.exists(&blob_ref).await {
                Ok(true) => {}
                Ok(false) => {
                    report.orphaned += 1;
                    match self
                        .files
                        .soft_delete(file.id, DeletionReason::BackendObjectMissing)
                        .await
                    {
                        Ok(true) => {
                            report.cleaned += 1;
                            info!(file_id = %file.id, blob = %blob_ref, "Orphaned file cleaned up");
                        }
                        Ok(false) => {}
                        Err(e) => warn!(file_id = %file.id, error = %e, "Failed to clean up orphan"),
                    }
                }
                Err(e) => {
                    warn!(file_id = %file.id, blob = %blob_ref, error = %e, "Existence check failed");
                }
            }
        }

        info!(
            checked = report.checked,
            orphaned = report.orphaned,
            cleaned = report.cleaned,
            "Orphan reconciliation completed"
        );
        Ok(report)
    }
}
