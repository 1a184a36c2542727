//! Reconciliation worker configuration.

use serde::{Deserialize, Serialize};

/// Scheduled reconciliation configuration.
///
/// Cron expressions use the six-field form (with seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the scheduler is started.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Schedule of the fleet-wide URL refresh.
    #[serde(default = "default_url_refresh_cron")]
    pub url_refresh_cron: String,
    /// Schedule of the orphan reconciliation.
    #[serde(default = "default_orphan_cron")]
    pub orphan_reconciliation_cron: String,
    /// Schedule of the folder tree consistency sweep.
    #[serde(default = "default_tree_sweep_cron")]
    pub tree_sweep_cron: String,
    /// Refresh a user's URLs right after they authenticate.
    #[serde(default = "default_true")]
    pub refresh_on_login: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url_refresh_cron: default_url_refresh_cron(),
            orphan_reconciliation_cron: default_orphan_cron(),
            tree_sweep_cron: default_tree_sweep_cron(),
            refresh_on_login: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_url_refresh_cron() -> String {
    "0 0 * * * *".to_string()
}

fn default_orphan_cron() -> String {
    "0 30 3 * * *".to_string()
}

fn default_tree_sweep_cron() -> String {
    "0 45 3 * * *".to_string()
}
