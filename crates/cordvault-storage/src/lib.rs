//! # cordvault-storage
//!
//! [`BlobStore`](cordvault_core::traits::BlobStore) implementations for
//! CordVault: a Discord REST adapter that stores each blob as a message
//! attachment, and a process-local adapter for development and tests.

pub mod manager;
pub mod providers;

pub use manager::build_blob_store;
pub use providers::{DiscordBlobStore, MemoryBlobStore};
