//! Process-local blob store.
//!
//! Used when `storage.provider = "memory"` and by the test suites. Besides
//! the [`BlobStore`] contract it exposes knobs for simulating backend
//! behaviour: readiness, out-of-band removal, URL expiry and failures.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;

use cordvault_core::error::AppError;
use cordvault_core::result::AppResult;
use cordvault_core::traits::blob::{BlobRef, BlobStore, DeleteOutcome, StoredBlob};

const URL_SCHEME: &str = "memory://";

#[derive(Debug, Clone)]
struct StoredObject {
    name: String,
    data: Bytes,
}

/// In-memory [`BlobStore`].
#[derive(Debug)]
pub struct MemoryBlobStore {
    channel_id: String,
    objects: DashMap<String, StoredObject>,
    next_id: AtomicU64,
    url_epoch: AtomicU64,
    ready: AtomicBool,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
    refuse_deletes: AtomicBool,
    fail_exists: AtomicBool,
    fail_refresh: AtomicBool,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBlobStore {
    /// Create a ready, empty store.
    pub fn new() -> Self {
        Self {
            channel_id: "memory".to_string(),
            objects: DashMap::new(),
            next_id: AtomicU64::new(1),
            url_epoch: AtomicU64::new(0),
            ready: AtomicBool::new(true),
            fail_puts: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            refuse_deletes: AtomicBool::new(false),
            fail_exists: AtomicBool::new(false),
            fail_refresh: AtomicBool::new(false),
        }
    }

    /// Toggle readiness.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Make `put` fail with `BackendUnavailable`.
    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Make `delete` fail with `BackendUnavailable`.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Make `delete` answer [`DeleteOutcome::Refused`].
    pub fn set_refuse_deletes(&self, refuse: bool) {
        self.refuse_deletes.store(refuse, Ordering::SeqCst);
    }

    /// Make `exists` fail with `BackendUnavailable`.
    pub fn set_fail_exists(&self, fail: bool) {
        self.fail_exists.store(fail, Ordering::SeqCst);
    }

    /// Make `refresh_url` fail with `BackendUnavailable`.
    pub fn set_fail_refresh(&self, fail: bool) {
        self.fail_refresh.store(fail, Ordering::SeqCst);
    }

    /// Drop a blob behind the application's back.
    pub fn remove_out_of_band(&self, blob_ref: &BlobRef) -> bool {
        self.objects.remove(&blob_ref.message_id).is_some()
    }

    /// Expire every outstanding URL; the next refresh yields new ones.
    pub fn rotate_urls(&self) {
        self.url_epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of blobs held.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn url_for(&self, message_id: &str, name: &str) -> String {
        format!(
            "{URL_SCHEME}{}/{message_id}/{name}?v={}",
            self.channel_id,
            self.url_epoch.load(Ordering::SeqCst)
        )
    }

    fn ensure_ready(&self) -> AppResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(AppError::backend_unavailable("Memory blob store is not ready"))
        }
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn put(&self, data: Bytes, name: &str, _original_name: &str) -> AppResult<StoredBlob> {
        self.ensure_ready()?;
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(AppError::backend_unavailable("Simulated upload failure"));
        }

        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let size_bytes = data.len() as u64;
        self.objects.insert(
            message_id.clone(),
            StoredObject {
                name: name.to_string(),
                data,
            },
        );
        debug!(message_id = %message_id, size_bytes, "Stored in-memory blob");

        Ok(StoredBlob {
            access_url: self.url_for(&message_id, name),
            blob_ref: BlobRef::new(self.channel_id.clone(), message_id),
            size_bytes,
        })
    }

    async fn delete(&self, blob_ref: &BlobRef) -> AppResult<DeleteOutcome> {
        self.ensure_ready()?;
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::backend_unavailable("Simulated delete failure"));
        }
        if self.refuse_deletes.load(Ordering::SeqCst) {
            return Ok(DeleteOutcome::Refused);
        }

        Ok(match self.objects.remove(&blob_ref.message_id) {
            Some(_) => DeleteOutcome::Removed,
            None => DeleteOutcome::AlreadyAbsent,
        })
    }

    async fn exists(&self, blob_ref: &BlobRef) -> AppResult<bool> {
        self.ensure_ready()?;
        if self.fail_exists.load(Ordering::SeqCst) {
            return Err(AppError::backend_unavailable("Simulated existence check failure"));
        }
        Ok(self.objects.contains_key(&blob_ref.message_id))
    }

    async fn refresh_url(&self, blob_ref: &BlobRef) -> AppResult<String> {
        self.ensure_ready()?;
        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(AppError::backend_unavailable("Simulated refresh failure"));
        }

        let name = self
            .objects
            .get(&blob_ref.message_id)
            .map(|o| o.name.clone())
            .ok_or_else(|| {
                AppError::backend_unavailable(format!("Blob {blob_ref} cannot be located"))
            })?;
        Ok(self.url_for(&blob_ref.message_id, &name))
    }

    async fn download(&self, url: &str) -> AppResult<Bytes> {
        self.ensure_ready()?;

        let message_id = url
            .strip_prefix(URL_SCHEME)
            .and_then(|rest| rest.split('/').nth(1))
            .ok_or_else(|| AppError::backend_unavailable(format!("Unsupported URL: {url}")))?;

        self.objects
            .get(message_id)
            .map(|o| o.data.clone())
            .ok_or_else(|| AppError::backend_unavailable("Failed to download file: HTTP 404"))
    }
}
