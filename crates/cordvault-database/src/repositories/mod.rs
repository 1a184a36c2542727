//! Repository contracts and PostgreSQL implementations for CordVault entities.
//!
//! Services depend only on [`FolderStore`] and [`FileStore`]; the
//! PostgreSQL repositories in this module and the in-memory stores in
//! [`crate::memory`] both implement them.

pub mod file;
pub mod folder;

use async_trait::async_trait;
use uuid::Uuid;

use cordvault_core::result::AppResult;
use cordvault_entity::file::{CreateFile, DeletionReason, File, UpdateFile};
use cordvault_entity::folder::{CreateFolder, Folder};

pub use file::FileRepository;
pub use folder::FolderRepository;

/// Persistence for folder records and their parent/children edges.
///
/// Edge mutations (`add_child`, `remove_child`) are idempotent set
/// operations on a single record so that a retried two-sided update
/// converges.
#[async_trait]
pub trait FolderStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a folder by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>>;

    /// All folders owned by a user.
    async fn find_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Folder>>;

    /// Folders of a user with no parent.
    async fn find_roots(&self, owner_id: Uuid) -> AppResult<Vec<Folder>>;

    /// Folders whose parent pointer is `parent_id`.
    async fn find_children(&self, parent_id: Uuid) -> AppResult<Vec<Folder>>;

    /// Every folder in the store.
    async fn find_all(&self) -> AppResult<Vec<Folder>>;

    /// Insert a new folder with an empty children set.
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Change a folder's name.
    async fn rename(&self, id: Uuid, name: &str) -> AppResult<Option<Folder>>;

    /// Persist a folder's parent pointer.
    async fn set_parent(&self, id: Uuid, parent_id: Option<Uuid>) -> AppResult<Option<Folder>>;

    /// Add `child_id` to `parent_id`'s children if absent.
    /// Returns `false` when the parent does not exist.
    async fn add_child(&self, parent_id: Uuid, child_id: Uuid) -> AppResult<bool>;

    /// Remove `child_id` from `parent_id`'s children if present.
    /// Returns `false` when the parent does not exist.
    async fn remove_child(&self, parent_id: Uuid, child_id: Uuid) -> AppResult<bool>;

    /// Overwrite a folder's children set, but only while it still equals
    /// `expected`. Returns `false` when the folder does not exist or its
    /// children changed since they were read.
    async fn replace_children(
        &self,
        id: Uuid,
        expected: &[Uuid],
        children: &[Uuid],
    ) -> AppResult<bool>;

    /// Delete a folder record. Returns `true` if deleted.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Persistence for file records.
///
/// Every `find_active_*` query excludes soft-deleted files.
#[async_trait]
pub trait FileStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a file by ID, including soft-deleted rows.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>>;

    /// Active files of an owner, newest first.
    async fn find_active_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<File>>;

    /// Active files in a folder, newest first.
    async fn find_active_by_folder(&self, folder_id: Uuid) -> AppResult<Vec<File>>;

    /// Number of active files in a folder.
    async fn count_active_in_folder(&self, folder_id: Uuid) -> AppResult<u64>;

    /// Active files carrying an external reference, optionally for one owner.
    async fn find_active_with_blob(&self, owner_id: Option<Uuid>) -> AppResult<Vec<File>>;

    /// Insert a new active file record.
    async fn create(&self, data: &CreateFile) -> AppResult<File>;

    /// Merge user-editable fields. Returns `None` if the file is missing.
    async fn update_metadata(&self, id: Uuid, update: &UpdateFile) -> AppResult<Option<File>>;

    /// Replace the access URL of an active file. Returns `true` if written.
    async fn update_url(&self, id: Uuid, url: &str) -> AppResult<bool>;

    /// Transition an active file to deleted. Returns `false` if the file
    /// is missing or already deleted.
    async fn soft_delete(&self, id: Uuid, reason: DeletionReason) -> AppResult<bool>;

    /// Unfile every file referencing `folder_id`. Returns the number touched.
    async fn detach_folder(&self, folder_id: Uuid) -> AppResult<u64>;
}
