//! DashMap-backed stores used when no database is configured and in tests.

pub mod file;
pub mod folder;

pub use file::MemoryFileStore;
pub use folder::MemoryFolderStore;
