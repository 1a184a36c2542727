//! # cordvault-entity
//!
//! Domain entity models for CordVault. Every struct in this crate
//! represents a database row or a domain value object. Database entities
//! derive `sqlx::FromRow`.

pub mod file;
pub mod folder;
pub mod storage;
