//! Storage backend domain types.

pub mod provider;

pub use provider::StorageProviderType;
