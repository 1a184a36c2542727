//! Blob store construction from configuration.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use cordvault_core::config::StorageConfig;
use cordvault_core::error::AppError;
use cordvault_core::result::AppResult;
use cordvault_core::traits::blob::BlobStore;

use crate::providers::{DiscordBlobStore, MemoryBlobStore};

/// Build the configured blob store.
///
/// The Discord store is returned immediately and connects in a background
/// task, so startup never waits on the backend. Must be called from within
/// a Tokio runtime.
pub fn build_blob_store(config: &StorageConfig) -> AppResult<Arc<dyn BlobStore>> {
    match config.provider.as_str() {
        "discord" => {
            let store = Arc::new(DiscordBlobStore::new(
                config.discord.clone(),
                Duration::from_secs(config.request_timeout_seconds),
            )?);

            let connecting = Arc::clone(&store);
            tokio::spawn(async move {
                if let Err(e) = connecting.connect().await {
                    error!(error = %e, "Discord blob store failed to connect");
                }
            });

            info!(channel_id = %config.discord.channel_id, "Discord blob store created");
            Ok(store as Arc<dyn BlobStore>)
        }
        "memory" => {
            info!("In-memory blob store created");
            Ok(Arc::new(MemoryBlobStore::new()))
        }
        other => Err(AppError::configuration(format!(
            "Unknown storage provider: {other}"
        ))),
    }
}
