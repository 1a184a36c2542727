//! # cordvault-core
//!
//! Core crate for CordVault. Contains the blob store contract,
//! configuration schemas, and the unified error system.
//!
//! This crate has **no** internal dependencies on other CordVault crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
