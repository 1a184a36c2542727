//! In-memory file store.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use cordvault_core::result::AppResult;
use cordvault_entity::file::{CreateFile, DeletionReason, File, UpdateFile};

use crate::repositories::FileStore;

/// A stored file plus its insertion sequence, used to break timestamp ties.
#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    file: File,
}

/// [`FileStore`] backed by a [`DashMap`].
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: DashMap<Uuid, Entry>,
    next_seq: AtomicU64,
}

impl MemoryFileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record, deleted ones included.
    pub fn all(&self) -> Vec<File> {
        self.files.iter().map(|e| e.value().file.clone()).collect()
    }

    fn newest_first<F>(&self, filter: F) -> Vec<File>
    where
        F: Fn(&File) -> bool,
    {
        let mut entries: Vec<Entry> = self
            .files
            .iter()
            .filter(|e| filter(&e.value().file))
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by(|a, b| {
            b.file
                .created_at
                .cmp(&a.file.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        entries.into_iter().map(|e| e.file).collect()
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>> {
        Ok(self.files.get(&id).map(|e| e.value().file.clone()))
    }

    async fn find_active_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<File>> {
        Ok(self.newest_first(|f| f.is_active() && f.owner_id == owner_id))
    }

    async fn find_active_by_folder(&self, folder_id: Uuid) -> AppResult<Vec<File>> {
        Ok(self.newest_first(|f| f.is_active() && f.folder_id == Some(folder_id)))
    }

    async fn count_active_in_folder(&self, folder_id: Uuid) -> AppResult<u64> {
        Ok(self
            .files
            .iter()
            .filter(|e| e.value().file.is_active() && e.value().file.folder_id == Some(folder_id))
            .count() as u64)
    }

    async fn find_active_with_blob(&self, owner_id: Option<Uuid>) -> AppResult<Vec<File>> {
        let mut files = self.newest_first(|f| {
            f.is_active()
                && f.blob_ref().is_some()
                && owner_id.is_none_or(|owner| f.owner_id == owner)
        });
        files.reverse();
        Ok(files)
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        let now = Utc::now();
        let file = File {
            id: Uuid::new_v4(),
            name: data.name.clone(),
            original_name: data.original_name.clone(),
            owner_id: data.owner_id,
            folder_id: data.folder_id,
            size_bytes: data.size_bytes,
            mime_type: data.mime_type.clone(),
            file_type: data.file_type.clone(),
            description: data.description.clone(),
            storage_provider: data.storage_provider,
            channel_id: Some(data.blob_ref.channel_id.clone()),
            message_id: Some(data.blob_ref.message_id.clone()),
            url: data.url.clone(),
            is_deleted: false,
            deleted_at: None,
            deletion_reason: None,
            created_at: now,
            updated_at: now,
        };
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.files.insert(
            file.id,
            Entry {
                seq,
                file: file.clone(),
            },
        );
        Ok(file)
    }

    async fn update_metadata(&self, id: Uuid, update: &UpdateFile) -> AppResult<Option<File>> {
        Ok(self.files.get_mut(&id).map(|mut entry| {
            let file = &mut entry.file;
            if let Some(name) = &update.name {
                file.name = name.clone();
            }
            if let Some(folder_id) = update.folder_id {
                file.folder_id = folder_id;
            }
            if let Some(description) = &update.description {
                file.description = Some(description.clone());
            }
            file.updated_at = Utc::now();
            file.clone()
        }))
    }

    async fn update_url(&self, id: Uuid, url: &str) -> AppResult<bool> {
        Ok(match self.files.get_mut(&id) {
            Some(mut entry) if entry.file.is_active() => {
                entry.file.url = url.to_string();
                entry.file.updated_at = Utc::now();
                true
            }
            _ => false,
        })
    }

    async fn soft_delete(&self, id: Uuid, reason: DeletionReason) -> AppResult<bool> {
        Ok(match self.files.get_mut(&id) {
            Some(mut entry) if entry.file.is_active() => {
                let now = Utc::now();
                entry.file.is_deleted = true;
                entry.file.deleted_at = Some(now);
                entry.file.deletion_reason = Some(reason.as_str().to_string());
                entry.file.updated_at = now;
                true
            }
            _ => false,
        })
    }

    async fn detach_folder(&self, folder_id: Uuid) -> AppResult<u64> {
        let mut touched = 0;
        for mut entry in self.files.iter_mut() {
            if entry.file.folder_id == Some(folder_id) {
                entry.file.folder_id = None;
                entry.file.updated_at = Utc::now();
                touched += 1;
            }
        }
        Ok(touched)
    }
}
