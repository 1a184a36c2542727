//! Folder tree maintenance jobs.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use cordvault_service::reconcile::TreeConsistencySweep;

use crate::executor::{JobExecutionError, JobHandler};
use crate::job::Job;

/// Job type served by [`MaintenanceJobHandler`].
pub const MAINTENANCE_JOB: &str = "maintenance";
/// Task: rebuild folder children sets from parent pointers.
pub const TASK_TREE_SWEEP: &str = "tree_sweep";

/// Handles maintenance tasks
#[derive(Debug)]
pub struct MaintenanceJobHandler {
    /// Folder tree sweep
    sweep: Arc<TreeConsistencySweep>,
}

impl MaintenanceJobHandler {
    /// Create a new maintenance job handler
    pub fn new(sweep: Arc<TreeConsistencySweep>) -> Self {
        Self { sweep }
    }

    async fn tree_sweep(&self) -> Result<Value, JobExecutionError> {
        let report = self
            .sweep
            .sweep()
            .await
            .map_err(JobExecutionError::from_app)?;

        Ok(serde_json::json!({
            "task": TASK_TREE_SWEEP,
            "checked": report.checked,
            "repaired": report.repaired,
        }))
    }
}

#[async_trait]
impl JobHandler for MaintenanceJobHandler {
    fn job_type(&self) -> &str {
        MAINTENANCE_JOB
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let result = match job.task() {
            TASK_TREE_SWEEP => self.tree_sweep().await?,
            task => {
                return Err(JobExecutionError::Permanent(format!(
                    "Unknown maintenance task: '{}'",
                    task
                )));
            }
        };

        Ok(Some(result))
    }
}
