//! Blob store implementations.

pub mod discord;
pub mod memory;

pub use discord::DiscordBlobStore;
pub use memory::MemoryBlobStore;
