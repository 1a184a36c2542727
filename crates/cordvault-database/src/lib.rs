//! # cordvault-database
//!
//! PostgreSQL connection management, the [`FolderStore`] and [`FileStore`]
//! contracts, and their PostgreSQL and in-memory implementations.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

use std::sync::Arc;

use tracing::{info, warn};

use cordvault_core::config::DatabaseConfig;
use cordvault_core::result::AppResult;

pub use connection::DatabasePool;
pub use memory::{MemoryFileStore, MemoryFolderStore};
pub use repositories::{FileRepository, FileStore, FolderRepository, FolderStore};

/// The pair of stores every service is built from.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Folder records and tree edges.
    pub folders: Arc<dyn FolderStore>,
    /// File records.
    pub files: Arc<dyn FileStore>,
}

impl Stores {
    /// Fresh in-memory stores.
    pub fn memory() -> Self {
        Self {
            folders: Arc::new(MemoryFolderStore::new()),
            files: Arc::new(MemoryFileStore::new()),
        }
    }

    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: &DatabasePool) -> Self {
        Self {
            folders: Arc::new(FolderRepository::new(pool.pool().clone())),
            files: Arc::new(FileRepository::new(pool.pool().clone())),
        }
    }

    /// Connect, migrate, and build PostgreSQL stores; fall back to memory
    /// stores when no database URL is configured.
    pub async fn from_config(config: &DatabaseConfig) -> AppResult<Self> {
        if !config.is_configured() {
            warn!("No database URL configured, using in-memory stores");
            return Ok(Self::memory());
        }

        let pool = DatabasePool::connect(config).await?;
        migration::run_migrations(pool.pool()).await?;
        info!("Database stores initialized");
        Ok(Self::postgres(&pool))
    }
}
