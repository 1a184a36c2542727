//! Blob store contract for the external object backend.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// The external identifiers needed to address a stored blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobRef {
    /// Container (channel) holding the blob.
    pub channel_id: String,
    /// Object (message) carrying the blob.
    pub message_id: String,
}

impl BlobRef {
    /// Create a new blob reference.
    pub fn new(channel_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            message_id: message_id.into(),
        }
    }
}

impl std::fmt::Display for BlobRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.channel_id, self.message_id)
    }
}

/// Result of a successful `put`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredBlob {
    /// Where the blob lives.
    pub blob_ref: BlobRef,
    /// Current (expiring) access URL.
    pub access_url: String,
    /// Number of bytes stored.
    pub size_bytes: u64,
}

/// Outcome of a remote delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteOutcome {
    /// The object was removed.
    Removed,
    /// The object was already gone.
    AlreadyAbsent,
    /// The backend refused (missing access or permission).
    Refused,
}

impl DeleteOutcome {
    /// Idempotent-delete view: `true` when the object no longer exists.
    pub fn is_gone(self) -> bool {
        matches!(self, Self::Removed | Self::AlreadyAbsent)
    }
}

/// Trait for the external blob backend.
///
/// The backend may not be connected at process start. Until
/// [`BlobStore::is_ready`] reports `true`, every other operation fails
/// with `BackendUnavailable`. Implementations bound every call with a
/// timeout.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider tag recorded on file metadata (e.g. `"discord"`).
    fn provider_type(&self) -> &str;

    /// Whether the backend session is established.
    fn is_ready(&self) -> bool;

    /// Store bytes under `name`; `original_name` is informational.
    async fn put(&self, data: Bytes, name: &str, original_name: &str) -> AppResult<StoredBlob>;

    /// Remove a blob. Access errors come back as [`DeleteOutcome::Refused`].
    async fn delete(&self, blob_ref: &BlobRef) -> AppResult<DeleteOutcome>;

    /// Check existence. Returns `false` only on a definitive not-found;
    /// any other failure is answered with `true`.
    async fn exists(&self, blob_ref: &BlobRef) -> AppResult<bool>;

    /// Obtain a fresh access URL for a stored blob.
    async fn refresh_url(&self, blob_ref: &BlobRef) -> AppResult<String>;

    /// Fetch the bytes behind an access URL.
    async fn download(&self, url: &str) -> AppResult<Bytes>;
}
