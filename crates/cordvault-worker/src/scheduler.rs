//! Cron scheduler for the reconciliation jobs.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use cordvault_core::config::WorkerConfig;
use cordvault_core::error::AppError;

use crate::executor::JobExecutor;
use crate::job::Job;
use crate::jobs::maintenance::{MAINTENANCE_JOB, TASK_TREE_SWEEP};
use crate::jobs::reconciliation::{
    RECONCILIATION_JOB, TASK_ORPHAN_RECONCILIATION, TASK_URL_REFRESH,
};

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Executor the fired jobs are handed to
    executor: Arc<JobExecutor>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("executor", &self.executor)
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(executor: Arc<JobExecutor>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            executor,
        })
    }

    /// Register all configured scheduled tasks
    pub async fn register_default_tasks(&self, config: &WorkerConfig) -> Result<(), AppError> {
        self.register(
            &config.url_refresh_cron,
            RECONCILIATION_JOB,
            TASK_URL_REFRESH,
        )
        .await?;
        self.register(
            &config.orphan_reconciliation_cron,
            RECONCILIATION_JOB,
            TASK_ORPHAN_RECONCILIATION,
        )
        .await?;
        self.register(&config.tree_sweep_cron, MAINTENANCE_JOB, TASK_TREE_SWEEP)
            .await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Fire `job_type`/`task` on `schedule`. Runs execute inline on the
    /// scheduler's task.
    async fn register(
        &self,
        schedule: &str,
        job_type: &'static str,
        task: &'static str,
    ) -> Result<(), AppError> {
        let executor = Arc::clone(&self.executor);
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            Box::pin(async move {
                tracing::debug!("Running scheduled {} job", task);
                executor.run_logged(Job::new(job_type, task)).await;
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid schedule '{}' for {}: {}",
                schedule, task, e
            ))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {} schedule: {}", task, e)))?;

        tracing::info!("Registered: {} ({})", task, schedule);
        Ok(())
    }
}
