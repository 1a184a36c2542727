//! Folder views joined with file counts.

use serde::{Deserialize, Serialize};

use super::model::Folder;

/// A folder together with the number of active files it contains.
///
/// The count is a best-effort snapshot taken after the listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderWithFileCount {
    /// The folder record.
    #[serde(flatten)]
    pub folder: Folder,
    /// Active files whose `folder_id` is this folder.
    pub file_count: u64,
}
