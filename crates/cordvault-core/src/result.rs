//! Convenience result type alias for CordVault.

use crate::error::AppError;

/// A specialized `Result` type for CordVault operations.
pub type AppResult<T> = Result<T, AppError>;
