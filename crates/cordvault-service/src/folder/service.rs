//! Folder CRUD and tree-edge maintenance.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{info, warn};
use uuid::Uuid;

use cordvault_core::error::AppError;
use cordvault_database::repositories::{FileStore, FolderStore};
use cordvault_entity::folder::{CreateFolder, Folder, FolderWithFileCount};
use cordvault_entity::folder::model::validate_folder_name;

use super::tree::TreeService;

/// Load a folder the given owner may see. Other owners' folders are
/// reported as missing.
pub(crate) async fn find_owned_folder(
    folders: &dyn FolderStore,
    owner_id: Uuid,
    folder_id: Uuid,
) -> Result<Folder, AppError> {
    folders
        .find_by_id(folder_id)
        .await?
        .filter(|f| f.owner_id == owner_id)
        .ok_or_else(|| AppError::not_found("Folder not found"))
}

/// Manages folders and keeps each folder's `children` set in step with
/// the parent pointers that reference it.
///
/// Edge writes are separate idempotent calls (remove from the old parent,
/// add to the new parent, then persist the pointer), so retrying a
/// partially applied operation converges.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Folder store.
    folders: Arc<dyn FolderStore>,
    /// File store, for counts and unfiling.
    files: Arc<dyn FileStore>,
    /// Ancestry queries.
    tree: TreeService,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(folders: Arc<dyn FolderStore>, files: Arc<dyn FileStore>) -> Self {
        Self {
            tree: TreeService::new(Arc::clone(&folders)),
            folders,
            files,
        }
    }

    /// Creates a folder, optionally under `parent_id`.
    pub async fn create_folder(
        &self,
        owner_id: Uuid,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Folder, AppError> {
        let record = CreateFolder::new(name, owner_id, parent_id)?;

        if let Some(parent_id) = parent_id {
            find_owned_folder(self.folders.as_ref(), owner_id, parent_id).await?;
        }

        let folder = self.folders.create(&record).await?;

        if let Some(parent_id) = parent_id {
            if !self.folders.add_child(parent_id, folder.id).await? {
                warn!(
                    folder_id = %folder.id,
                    parent_id = %parent_id,
                    "Parent disappeared while creating folder"
                );
            }
        }

        info!(
            owner_id = %owner_id,
            folder_id = %folder.id,
            parent_id = ?parent_id,
            "Folder created"
        );

        Ok(folder)
    }

    /// Gets a folder by ID.
    pub async fn get_folder(&self, owner_id: Uuid, folder_id: Uuid) -> Result<Folder, AppError> {
        find_owned_folder(self.folders.as_ref(), owner_id, folder_id).await
    }

    /// Renames a folder.
    pub async fn rename_folder(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
        new_name: &str,
    ) -> Result<Folder, AppError> {
        let name = validate_folder_name(new_name)?;
        self.get_folder(owner_id, folder_id).await?;

        let folder = self
            .folders
            .rename(folder_id, &name)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;

        info!(owner_id = %owner_id, folder_id = %folder_id, "Folder renamed");
        Ok(folder)
    }

    /// Moves a folder under `new_parent` (or to the root when `None`).
    pub async fn reparent(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
        new_parent: Option<Uuid>,
    ) -> Result<Folder, AppError> {
        let folder = self.get_folder(owner_id, folder_id).await?;

        if let Some(parent_id) = new_parent {
            if parent_id == folder_id {
                return Err(AppError::cycle("A folder cannot be its own parent"));
            }
            find_owned_folder(self.folders.as_ref(), owner_id, parent_id).await?;
            self.tree.ensure_can_attach(folder_id, parent_id).await?;
        }

        if folder.parent_id == new_parent {
            return Ok(folder);
        }

        if let Some(old_parent) = folder.parent_id {
            self.folders.remove_child(old_parent, folder_id).await?;
        }
        if let Some(parent_id) = new_parent {
            self.folders.add_child(parent_id, folder_id).await?;
        }

        let moved = self
            .folders
            .set_parent(folder_id, new_parent)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;

        info!(
            owner_id = %owner_id,
            folder_id = %folder_id,
            from = ?folder.parent_id,
            to = ?new_parent,
            "Folder moved"
        );

        Ok(moved)
    }

    /// Deletes a childless folder. Files that were in it become unfiled.
    pub async fn delete_folder(&self, owner_id: Uuid, folder_id: Uuid) -> Result<(), AppError> {
        let folder = self.get_folder(owner_id, folder_id).await?;

        if folder.has_children() || !self.folders.find_children(folder_id).await?.is_empty() {
            return Err(AppError::has_children(
                "Cannot delete a folder that contains subfolders",
            ));
        }

        if let Some(parent_id) = folder.parent_id {
            self.folders.remove_child(parent_id, folder_id).await?;
        }

        if !self.folders.delete(folder_id).await? {
            return Err(AppError::not_found("Folder not found"));
        }

        let unfiled = self.files.detach_folder(folder_id).await?;

        info!(
            owner_id = %owner_id,
            folder_id = %folder_id,
            unfiled,
            "Folder deleted"
        );

        Ok(())
    }

    /// Lists the direct subfolders of a folder.
    pub async fn list_children(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
    ) -> Result<Vec<Folder>, AppError> {
        self.get_folder(owner_id, folder_id).await?;
        let children = self.folders.find_children(folder_id).await?;
        Ok(children
            .into_iter()
            .filter(|f| f.owner_id == owner_id)
            .collect())
    }

    /// Lists an owner's top-level folders.
    pub async fn list_roots(&self, owner_id: Uuid) -> Result<Vec<Folder>, AppError> {
        Ok(self.folders.find_roots(owner_id).await?)
    }

    /// Lists every folder of an owner.
    pub async fn list_folders(&self, owner_id: Uuid) -> Result<Vec<Folder>, AppError> {
        Ok(self.folders.find_by_owner(owner_id).await?)
    }

    /// Subfolders of a folder, each with its active file count.
    pub async fn children_with_file_count(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
    ) -> Result<Vec<FolderWithFileCount>, AppError> {
        let children = self.list_children(owner_id, folder_id).await?;
        self.with_file_counts(children).await
    }

    /// Top-level folders of an owner, each with its active file count.
    pub async fn roots_with_file_count(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<FolderWithFileCount>, AppError> {
        let roots = self.list_roots(owner_id).await?;
        self.with_file_counts(roots).await
    }

    /// Every folder of an owner, each with its active file count.
    pub async fn folders_with_file_count(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<FolderWithFileCount>, AppError> {
        let folders = self.list_folders(owner_id).await?;
        self.with_file_counts(folders).await
    }

    /// One count lookup per folder. Counts are a snapshot, not
    /// transactional with the listing.
    async fn with_file_counts(
        &self,
        folders: Vec<Folder>,
    ) -> Result<Vec<FolderWithFileCount>, AppError> {
        try_join_all(folders.into_iter().map(|folder| async move {
            let file_count = self.files.count_active_in_folder(folder.id).await?;
            Ok::<_, AppError>(FolderWithFileCount { folder, file_count })
        }))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use cordvault_core::error::ErrorKind;
    use cordvault_database::memory::{MemoryFileStore, MemoryFolderStore};

    fn service() -> FolderService {
        FolderService::new(
            Arc::new(MemoryFolderStore::new()),
            Arc::new(MemoryFileStore::new()),
        )
    }

    #[tokio::test]
    async fn test_create_under_parent_links_both_sides() {
        let svc = service();
        let owner = Uuid::new_v4();
        let a = svc.create_folder(owner, "A", None).await.unwrap();
        let b = svc.create_folder(owner, "B", Some(a.id)).await.unwrap();

        let a = svc.get_folder(owner, a.id).await.unwrap();
        assert_eq!(a.children, vec![b.id]);
        assert_eq!(b.parent_id, Some(a.id));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name_and_missing_parent() {
        let svc = service();
        let owner = Uuid::new_v4();

        let err = svc.create_folder(owner, "   ", None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = svc
            .create_folder(owner, "x", Some(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_other_owners_folders_are_not_found() {
        let svc = service();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let a = svc.create_folder(alice, "A", None).await.unwrap();

        let err = svc.get_folder(bob, a.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        let err = svc.create_folder(bob, "B", Some(a.id)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_reparent_to_current_parent_is_noop() {
        let svc = service();
        let owner = Uuid::new_v4();
        let a = svc.create_folder(owner, "A", None).await.unwrap();
        let b = svc.create_folder(owner, "B", Some(a.id)).await.unwrap();

        let moved = svc.reparent(owner, b.id, Some(a.id)).await.unwrap();
        assert_eq!(moved.parent_id, Some(a.id));
        let a = svc.get_folder(owner, a.id).await.unwrap();
        assert_eq!(a.children, vec![b.id]);
    }

    #[tokio::test]
    async fn test_reparent_into_self_is_cycle() {
        let svc = service();
        let owner = Uuid::new_v4();
        let a = svc.create_folder(owner, "A", None).await.unwrap();

        let err = svc.reparent(owner, a.id, Some(a.id)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Cycle);
    }

    #[tokio::test]
    async fn test_rename_validates() {
        let svc = service();
        let owner = Uuid::new_v4();
        let a = svc.create_folder(owner, "A", None).await.unwrap();

        let renamed = svc.rename_folder(owner, a.id, "  Docs ").await.unwrap();
        assert_eq!(renamed.name, "Docs");
        let err = svc.rename_folder(owner, a.id, "").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
