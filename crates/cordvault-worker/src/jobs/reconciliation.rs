//! URL refresh and orphan reconciliation jobs.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing;
use uuid::Uuid;

use cordvault_service::reconcile::{OrphanReconciler, UrlRefreshService};

use crate::executor::{JobExecutionError, JobHandler};
use crate::job::Job;

/// Job type served by [`ReconciliationJobHandler`].
pub const RECONCILIATION_JOB: &str = "reconciliation";
/// Task: refresh access URLs, optionally for one `owner_id`.
pub const TASK_URL_REFRESH: &str = "url_refresh";
/// Task: soft-delete files whose backend object is gone.
pub const TASK_ORPHAN_RECONCILIATION: &str = "orphan_reconciliation";

/// Handles blob reconciliation tasks
#[derive(Debug)]
pub struct ReconciliationJobHandler {
    /// URL refresh procedure
    refresh: Arc<UrlRefreshService>,
    /// Orphan detection procedure
    orphans: Arc<OrphanReconciler>,
}

impl ReconciliationJobHandler {
    /// Create a new reconciliation job handler
    pub fn new(refresh: Arc<UrlRefreshService>, orphans: Arc<OrphanReconciler>) -> Self {
        Self { refresh, orphans }
    }

    async fn refresh_urls(&self, job: &Job) -> Result<Value, JobExecutionError> {
        let owner_id = match job.payload.get("owner_id") {
            None | Some(Value::Null) => None,
            Some(v) => Some(serde_json::from_value::<Uuid>(v.clone()).map_err(|e| {
                JobExecutionError::Permanent(format!("Invalid owner_id: {}", e))
            })?),
        };

        let updated = self
            .refresh
            .refresh_urls(owner_id)
            .await
            .map_err(JobExecutionError::from_app)?;

        Ok(serde_json::json!({
            "task": TASK_URL_REFRESH,
            "owner_id": owner_id,
            "updated": updated,
        }))
    }

    async fn reconcile_orphans(&self) -> Result<Value, JobExecutionError> {
        let report = self
            .orphans
            .reconcile()
            .await
            .map_err(JobExecutionError::from_app)?;

        tracing::info!(
            "Orphan reconciliation: {} checked, {} orphaned, {} cleaned",
            report.checked,
            report.orphaned,
            report.cleaned
        );

        Ok(serde_json::json!({
            "task": TASK_ORPHAN_RECONCILIATION,
            "checked": report.checked,
            "orphaned": report.orphaned,
            "cleaned": report.cleaned,
        }))
    }
}

#[async_trait]
impl JobHandler for ReconciliationJobHandler {
    fn job_type(&self) -> &str {
        RECONCILIATION_JOB
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let result = match job.task() {
            TASK_URL_REFRESH => self.refresh_urls(job).await?,
            TASK_ORPHAN_RECONCILIATION => self.reconcile_orphans().await?,
            task => {
                return Err(JobExecutionError::Permanent(format!(
                    "Unknown reconciliation task: '{}'",
                    task
                )));
            }
        };

        Ok(Some(result))
    }
}
