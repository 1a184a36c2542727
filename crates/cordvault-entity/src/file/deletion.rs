//! Soft-delete reasons.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a file moved from active to deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionReason {
    /// The owner deleted it and the backend object was removed.
    UserDeleted,
    /// The owner deleted it; the backend object was already gone.
    UserDeletedBackendAbsent,
    /// The owner deleted it; the backend delete failed or was refused.
    UserDeletedBackendFailed,
    /// Orphan reconciliation found no backend object.
    BackendObjectMissing,
}

impl DeletionReason {
    /// The string persisted in `deletion_reason`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserDeleted => "user deletion",
            Self::UserDeletedBackendAbsent => "user deletion (backend object already absent)",
            Self::UserDeletedBackendFailed => "user deletion (backend delete failed)",
            Self::BackendObjectMissing => "backend object missing",
        }
    }
}

impl fmt::Display for DeletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
