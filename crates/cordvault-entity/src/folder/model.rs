//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use cordvault_core::error::AppError;

/// Maximum folder name length in characters.
pub const MAX_FOLDER_NAME_LEN: usize = 255;

/// A folder in a user's hierarchy.
///
/// `children` is a denormalized copy of the set of folders whose
/// `parent_id` equals this folder's id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// Folder name.
    pub name: String,
    /// The folder owner. Never changes.
    pub owner_id: Uuid,
    /// Parent folder ID (None for root folders).
    pub parent_id: Option<Uuid>,
    /// Child folder IDs.
    pub children: Vec<Uuid>,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether the stored children set is non-empty.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Folder name.
    pub name: String,
    /// The folder owner.
    pub owner_id: Uuid,
    /// Parent folder (None for root).
    pub parent_id: Option<Uuid>,
}

impl CreateFolder {
    /// Build a validated creation payload. The name is trimmed.
    pub fn new(
        name: &str,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            name: validate_folder_name(name)?,
            owner_id,
            parent_id,
        })
    }
}

/// Trim and check a folder name.
pub fn validate_folder_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Folder name cannot be empty"));
    }
    if trimmed.chars().count() > MAX_FOLDER_NAME_LEN {
        return Err(AppError::validation(format!(
            "Folder name exceeds {MAX_FOLDER_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}
