//! Core traits defined in `cordvault-core` and implemented by other crates.

pub mod blob;

pub use blob::{BlobRef, BlobStore, DeleteOutcome, StoredBlob};
