//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use uuid::Uuid;

use cordvault_core::config::{StorageConfig, WorkerConfig};
use cordvault_core::traits::blob::BlobStore;
use cordvault_database::repositories::{FileStore, FolderStore};
use cordvault_database::{MemoryFileStore, MemoryFolderStore};
use cordvault_entity::file::File;
use cordvault_entity::folder::Folder;
use cordvault_service::{
    DownloadService, FileService, FolderService, OrphanReconciler, PostLoginRefresh,
    TreeConsistencySweep, UploadRequest, UploadService, UrlRefreshService,
};
use cordvault_storage::MemoryBlobStore;

/// Every service wired against in-memory stores and an in-memory blob
/// backend whose failure modes can be toggled.
pub struct TestVault {
    /// Concrete folder store, for seeding inconsistent records.
    pub folder_store: Arc<MemoryFolderStore>,
    /// Concrete file store, for inspecting every record.
    pub file_store: Arc<MemoryFileStore>,
    /// Blob backend.
    pub blobs: Arc<MemoryBlobStore>,
    pub folders: FolderService,
    pub files: FileService,
    pub uploads: UploadService,
    pub downloads: DownloadService,
    pub refresh: Arc<UrlRefreshService>,
    pub orphans: OrphanReconciler,
    pub sweep: TreeConsistencySweep,
    pub login: PostLoginRefresh,
}

impl TestVault {
    /// Create a vault with default upload limits.
    pub fn new() -> Self {
        Self::with_config(StorageConfig::default())
    }

    /// Create a vault with the given upload limits.
    pub fn with_config(config: StorageConfig) -> Self {
        let folder_store = Arc::new(MemoryFolderStore::new());
        let file_store = Arc::new(MemoryFileStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());

        let folders_dyn: Arc<dyn FolderStore> = folder_store.clone();
        let files_dyn: Arc<dyn FileStore> = file_store.clone();
        let blobs_dyn: Arc<dyn BlobStore> = blobs.clone();

        let refresh = Arc::new(UrlRefreshService::new(
            Arc::clone(&files_dyn),
            Arc::clone(&blobs_dyn),
        ));

        Self {
            folders: FolderService::new(Arc::clone(&folders_dyn), Arc::clone(&files_dyn)),
            files: FileService::new(
                Arc::clone(&files_dyn),
                Arc::clone(&folders_dyn),
                Arc::clone(&blobs_dyn),
            ),
            uploads: UploadService::new(
                Arc::clone(&files_dyn),
                Arc::clone(&folders_dyn),
                Arc::clone(&blobs_dyn),
                config,
            ),
            downloads: DownloadService::new(Arc::clone(&files_dyn), Arc::clone(&blobs_dyn)),
            orphans: OrphanReconciler::new(Arc::clone(&files_dyn), Arc::clone(&blobs_dyn)),
            sweep: TreeConsistencySweep::new(Arc::clone(&folders_dyn)),
            login: PostLoginRefresh::from_config(Arc::clone(&refresh), &WorkerConfig::default()),
            refresh,
            folder_store,
            file_store,
            blobs,
        }
    }

    /// Upload a small text file, optionally into a folder.
    pub async fn upload_text(&self, owner: Uuid, name: &str, folder: Option<Uuid>) -> File {
        let mut req = UploadRequest::new(format!("contents of {name}"), name, "text/plain");
        if let Some(folder) = folder {
            req = req.in_folder(folder);
        }
        self.uploads
            .upload_file(owner, req)
            .await
            .expect("Failed to upload test file")
    }

    /// Create a folder.
    pub async fn mkdir(&self, owner: Uuid, name: &str, parent: Option<Uuid>) -> Folder {
        self.folders
            .create_folder(owner, name, parent)
            .await
            .expect("Failed to create test folder")
    }

    /// Re-read a folder.
    pub async fn folder(&self, owner: Uuid, id: Uuid) -> Folder {
        self.folders
            .get_folder(owner, id)
            .await
            .expect("Folder should exist")
    }

    /// Re-read a file record, deleted or not.
    pub async fn raw_file(&self, id: Uuid) -> File {
        self.file_store
            .find_by_id(id)
            .await
            .expect("File store lookup failed")
            .expect("File record should exist")
    }

    /// Assert that every folder's `children` set matches exactly the
    /// folders pointing at it.
    pub async fn assert_tree_consistent(&self) {
        let all = self
            .folder_store
            .find_all()
            .await
            .expect("Failed to list folders");

        for folder in &all {
            let mut expected: Vec<Uuid> = all
                .iter()
                .filter(|f| f.parent_id == Some(folder.id))
                .map(|f| f.id)
                .collect();
            let mut actual = folder.children.clone();
            expected.sort();
            actual.sort();
            assert_eq!(
                actual, expected,
                "children of folder '{}' disagree with parent pointers",
                folder.name
            );
        }
    }
}
