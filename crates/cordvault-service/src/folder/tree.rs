//! Ancestry walks and cycle detection over the folder tree.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use cordvault_core::error::AppError;
use cordvault_database::repositories::FolderStore;

/// Read-only queries over parent pointers.
#[derive(Debug, Clone)]
pub struct TreeService {
    /// Folder store.
    folders: Arc<dyn FolderStore>,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(folders: Arc<dyn FolderStore>) -> Self {
        Self { folders }
    }

    /// IDs from `folder_id`'s parent up to its root, nearest first.
    ///
    /// A dangling parent pointer ends the walk. A pointer loop already in
    /// the store fails with `Cycle` instead of spinning.
    pub async fn ancestors(&self, folder_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let mut visited = HashSet::from([folder_id]);
        let mut chain = Vec::new();
        let mut current = folder_id;

        while let Some(folder) = self.folders.find_by_id(current).await? {
            let Some(parent_id) = folder.parent_id else {
                break;
            };
            if !visited.insert(parent_id) {
                return Err(AppError::cycle(format!(
                    "Folder tree contains a cycle through {parent_id}"
                )));
            }
            chain.push(parent_id);
            current = parent_id;
        }

        Ok(chain)
    }

    /// Whether `candidate` is `folder_id` itself or sits below it.
    pub async fn is_self_or_descendant(
        &self,
        candidate: Uuid,
        folder_id: Uuid,
    ) -> Result<bool, AppError> {
        if candidate == folder_id {
            return Ok(true);
        }
        Ok(self.ancestors(candidate).await?.contains(&folder_id))
    }

    /// Fails with `Cycle` if `folder_id` may not be placed under `new_parent`.
    pub async fn ensure_can_attach(&self, folder_id: Uuid, new_parent: Uuid) -> Result<(), AppError> {
        if self.is_self_or_descendant(new_parent, folder_id).await? {
            return Err(AppError::cycle(
                "Cannot move a folder into itself or one of its descendants",
            ));
        }
        Ok(())
    }
}
