//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use cordvault_core::traits::blob::BlobRef;

use crate::storage::StorageProviderType;

/// A file whose bytes live on the blob backend.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// Storage-facing name (declared or generated).
    pub name: String,
    /// Name as uploaded.
    pub original_name: String,
    /// The file owner.
    pub owner_id: Uuid,
    /// The folder containing this file (None = unfiled).
    pub folder_id: Option<Uuid>,
    /// File size in bytes.
    pub size_bytes: i64,
    /// MIME type as reported at upload.
    pub mime_type: String,
    /// Lowercase extension including the dot, or empty.
    pub file_type: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Backend the bytes live on.
    pub storage_provider: StorageProviderType,
    /// Backend container identifier.
    pub channel_id: Option<String>,
    /// Backend object identifier.
    pub message_id: Option<String>,
    /// Current access URL. Refreshed by reconciliation.
    pub url: String,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// When the file was soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Why the file was soft-deleted.
    pub deletion_reason: Option<String>,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// The external reference, when both identifiers are present.
    pub fn blob_ref(&self) -> Option<BlobRef> {
        match (&self.channel_id, &self.message_id) {
            (Some(channel), Some(message)) if !channel.is_empty() && !message.is_empty() => {
                Some(BlobRef::new(channel.clone(), message.clone()))
            }
            _ => None,
        }
    }

    /// Whether the file is visible to listings and lookups.
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// Storage-facing name.
    pub name: String,
    /// Name as uploaded.
    pub original_name: String,
    /// The file owner.
    pub owner_id: Uuid,
    /// Target folder.
    pub folder_id: Option<Uuid>,
    /// File size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime_type: String,
    /// Lowercase extension including the dot.
    pub file_type: String,
    /// Optional description.
    pub description: Option<String>,
    /// Backend the bytes were written to.
    pub storage_provider: StorageProviderType,
    /// Where the bytes were written.
    pub blob_ref: BlobRef,
    /// Access URL returned by the backend.
    pub url: String,
}

/// Partial update of a file's user-editable metadata.
///
/// `folder_id` uses a nested option: `None` leaves the folder unchanged,
/// `Some(None)` unfiles the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFile {
    /// New storage-facing name.
    pub name: Option<String>,
    /// New folder.
    pub folder_id: Option<Option<Uuid>>,
    /// New description.
    pub description: Option<String>,
}

impl UpdateFile {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.folder_id.is_none() && self.description.is_none()
    }
}

/// Return the extension of a file name as written, including the dot.
pub fn raw_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < name.len() => &name[pos..],
        _ => "",
    }
}

/// Return the lowercase extension of a file name, including the dot.
pub fn extension_of(name: &str) -> String {
    raw_extension(name).to_lowercase()
}
