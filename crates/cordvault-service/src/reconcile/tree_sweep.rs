//! Folder tree consistency sweep.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use cordvault_core::error::AppError;
use cordvault_database::repositories::FolderStore;
use cordvault_entity::folder::Folder;

/// Counts from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSweepReport {
    /// Folders examined.
    pub checked: u64,
    /// Records rewritten.
    pub repaired: u64,
}

/// Rebuilds every folder's `children` set from parent pointers.
///
/// Parent pointers are authoritative. A pointer to a folder that no
/// longer exists is reset to root. Each folder is re-read before it is
/// repaired and the write only lands if its children are unchanged, so
/// edge updates made by concurrent requests are never overwritten.
#[derive(Debug, Clone)]
pub struct TreeConsistencySweep {
    folders: Arc<dyn FolderStore>,
}

/// Conditional writes attempted per folder before it is left for the
/// next sweep.
const MAX_REPAIR_ATTEMPTS: usize = 3;

impl TreeConsistencySweep {
    /// Creates a new sweep.
    pub fn new(folders: Arc<dyn FolderStore>) -> Self {
        Self { folders }
    }

    /// Run one pass over every folder.
    pub async fn sweep(&self) -> Result<TreeSweepReport, AppError> {
        let folders = self.folders.find_all().await?;
        let mut report = TreeSweepReport {
            checked: folders.len() as u64,
            repaired: 0,
        };

        for folder in &folders {
            if self.reset_dangling_parent(folder).await? {
                report.repaired += 1;
            }
        }

        for folder in &folders {
            if self.rebuild_children(folder.id).await? {
                report.repaired += 1;
            }
        }

        info!(
            checked = report.checked,
            repaired = report.repaired,
            "Folder tree sweep completed"
        );
        Ok(report)
    }

    async fn reset_dangling_parent(&self, folder: &Folder) -> Result<bool, AppError> {
        let Some(parent_id) = folder.parent_id else {
            return Ok(false);
        };
        if self.folders.find_by_id(parent_id).await?.is_some() {
            return Ok(false);
        }

        // Moved or deleted since the listing.
        match self.folders.find_by_id(folder.id).await? {
            Some(current) if current.parent_id == Some(parent_id) => {}
            _ => return Ok(false),
        }

        warn!(folder_id = %folder.id, parent_id = %parent_id, "Dangling parent, moving to root");
        self.folders.set_parent(folder.id, None).await?;
        Ok(true)
    }

    async fn rebuild_children(&self, id: Uuid) -> Result<bool, AppError> {
        for attempt in 1..=MAX_REPAIR_ATTEMPTS {
            // The record is read before the pointers so that any edge
            // write landing in between fails the conditional update.
            let Some(folder) = self.folders.find_by_id(id).await? else {
                return Ok(false);
            };
            let pointing: Vec<Uuid> = self
                .folders
                .find_children(id)
                .await?
                .into_iter()
                .map(|f| f.id)
                .collect();

            let Some(children) = repaired_children(&folder.children, &pointing) else {
                return Ok(false);
            };

            if self
                .folders
                .replace_children(id, &folder.children, &children)
                .await?
            {
                warn!(
                    folder_id = %id,
                    stored = folder.children.len(),
                    actual = children.len(),
                    "Folder children out of sync, repaired"
                );
                return Ok(true);
            }
            debug!(folder_id = %id, attempt, "Folder children changed during repair, retrying");
        }

        warn!(folder_id = %id, "Folder children kept changing, leaving for the next sweep");
        Ok(false)
    }
}

/// The children list `stored` should hold given the folders `pointing`
/// at it, or `None` when it already matches.
///
/// Surviving entries keep their stored order; missing ones are appended.
fn repaired_children(stored: &[Uuid], pointing: &[Uuid]) -> Option<Vec<Uuid>> {
    let have: HashSet<&Uuid> = stored.iter().collect();
    let want: HashSet<&Uuid> = pointing.iter().collect();
    if have == want && have.len() == stored.len() {
        return None;
    }

    let mut seen = HashSet::new();
    let mut children: Vec<Uuid> = stored
        .iter()
        .filter(|id| want.contains(id) && seen.insert(**id))
        .copied()
        .collect();
    for id in pointing {
        if seen.insert(*id) {
            children.push(*id);
        }
    }
    Some(children)
}
