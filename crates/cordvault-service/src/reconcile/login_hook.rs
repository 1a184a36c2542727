//! Refresh-on-login trigger.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use cordvault_core::config::WorkerConfig;

use super::url_refresh::UrlRefreshService;

/// Warms a user's file URLs right after they authenticate.
///
/// The refresh runs on its own task; failures are logged and never reach
/// the login flow.
#[derive(Debug, Clone)]
pub struct PostLoginRefresh {
    refresh: Arc<UrlRefreshService>,
    enabled: bool,
}

impl PostLoginRefresh {
    /// Creates a new hook. A disabled hook does nothing.
    pub fn new(refresh: Arc<UrlRefreshService>, enabled: bool) -> Self {
        Self { refresh, enabled }
    }

    /// Creates a hook enabled per `worker.refresh_on_login`.
    pub fn from_config(refresh: Arc<UrlRefreshService>, config: &WorkerConfig) -> Self {
        Self::new(refresh, config.refresh_on_login)
    }

    /// Call after `owner_id` successfully authenticates. Returns the
    /// spawned task, if any.
    pub fn on_authenticated(&self, owner_id: Uuid) -> Option<JoinHandle<()>> {
        if !self.enabled {
            return None;
        }

        let refresh = Arc::clone(&self.refresh);
        Some(tokio::spawn(async move {
            match refresh.refresh_urls(Some(owner_id)).await {
                Ok(updated) => debug!(owner_id = %owner_id, updated, "Post-login URL refresh done"),
                Err(e) => warn!(owner_id = %owner_id, error = %e, "Post-login URL refresh failed"),
            }
        }))
    }
}
