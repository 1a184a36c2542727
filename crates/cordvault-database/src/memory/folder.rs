//! In-memory folder store.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use cordvault_core::result::AppResult;
use cordvault_entity::folder::{CreateFolder, Folder};

use crate::repositories::FolderStore;

/// [`FolderStore`] backed by a [`DashMap`].
///
/// Every mutation touches exactly one entry, mirroring the single-row
/// updates of the PostgreSQL repository.
#[derive(Debug, Default)]
pub struct MemoryFolderStore {
    folders: DashMap<Uuid, Folder>,
}

impl MemoryFolderStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a raw record, bypassing edge maintenance.
    pub fn insert_raw(&self, folder: Folder) {
        self.folders.insert(folder.id, folder);
    }

    fn collect<F>(&self, filter: F) -> Vec<Folder>
    where
        F: Fn(&Folder) -> bool,
    {
        let mut folders: Vec<Folder> = self
            .folders
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        folders
    }
}

#[async_trait]
impl FolderStore for MemoryFolderStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        Ok(self.folders.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Folder>> {
        Ok(self.collect(|f| f.owner_id == owner_id))
    }

    async fn find_roots(&self, owner_id: Uuid) -> AppResult<Vec<Folder>> {
        Ok(self.collect(|f| f.owner_id == owner_id && f.parent_id.is_none()))
    }

    async fn find_children(&self, parent_id: Uuid) -> AppResult<Vec<Folder>> {
        Ok(self.collect(|f| f.parent_id == Some(parent_id)))
    }

    async fn find_all(&self) -> AppResult<Vec<Folder>> {
        let mut folders = self.collect(|_| true);
        folders.sort_by_key(|f| f.created_at);
        Ok(folders)
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        let now = Utc::now();
        let folder = Folder {
            id: Uuid::new_v4(),
            name: data.name.clone(),
            owner_id: data.owner_id,
            parent_id: data.parent_id,
            children: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn rename(&self, id: Uuid, name: &str) -> AppResult<Option<Folder>> {
        Ok(self.folders.get_mut(&id).map(|mut entry| {
            entry.name = name.to_string();
            entry.updated_at = Utc::now();
            entry.clone()
        }))
    }

    async fn set_parent(&self, id: Uuid, parent_id: Option<Uuid>) -> AppResult<Option<Folder>> {
        Ok(self.folders.get_mut(&id).map(|mut entry| {
            entry.parent_id = parent_id;
            entry.updated_at = Utc::now();
            entry.clone()
        }))
    }

    async fn add_child(&self, parent_id: Uuid, child_id: Uuid) -> AppResult<bool> {
        Ok(match self.folders.get_mut(&parent_id) {
            Some(mut parent) => {
                if !parent.children.contains(&child_id) {
                    parent.children.push(child_id);
                    parent.updated_at = Utc::now();
                }
                true
            }
            None => false,
        })
    }

    async fn remove_child(&self, parent_id: Uuid, child_id: Uuid) -> AppResult<bool> {
        Ok(match self.folders.get_mut(&parent_id) {
            Some(mut parent) => {
                parent.children.retain(|id| *id != child_id);
                parent.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn replace_children(
        &self,
        id: Uuid,
        expected: &[Uuid],
        children: &[Uuid],
    ) -> AppResult<bool> {
        Ok(match self.folders.get_mut(&id) {
            Some(mut folder) if folder.children == expected => {
                folder.children = children.to_vec();
                folder.updated_at = Utc::now();
                true
            }
            _ => false,
        })
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.folders.remove(&id).is_some())
    }
}
