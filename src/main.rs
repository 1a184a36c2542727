//! CordVault server. Wires the crates together and runs the background
//! reconciliation schedule, or a single reconciliation task on demand.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

use cordvault_core::config::{AppConfig, LoggingConfig};
use cordvault_core::error::AppError;
use cordvault_core::traits::blob::BlobStore;
use cordvault_database::Stores;
use cordvault_service::{OrphanReconciler, TreeConsistencySweep, UrlRefreshService};
use cordvault_worker::jobs::maintenance::{MAINTENANCE_JOB, TASK_TREE_SWEEP};
use cordvault_worker::jobs::reconciliation::{
    RECONCILIATION_JOB, TASK_ORPHAN_RECONCILIATION, TASK_URL_REFRESH,
};
use cordvault_worker::jobs::{MaintenanceJobHandler, ReconciliationJobHandler};
use cordvault_worker::{CronScheduler, Job, JobExecutor};

/// How long one-shot commands wait for the blob backend to come up.
const READY_WAIT: Duration = Duration::from_secs(15);

/// CordVault: file storage on a chat-platform blob backend
#[derive(Debug, Parser)]
#[command(name = "cordvault-server", version, about, long_about = None)]
struct Cli {
    /// Environment overlay loaded from `config/<env>.toml`
    #[arg(short, long, env = "CORDVAULT_ENV", default_value = "development")]
    env: String,

    /// Command to run; defaults to `serve`
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the scheduled reconciliation jobs until interrupted
    Serve,
    /// Refresh stored access URLs once
    RefreshUrls {
        /// Only refresh this owner's files
        #[arg(long)]
        owner: Option<Uuid>,
    },
    /// Soft-delete files whose backend object is gone
    ReconcileOrphans,
    /// Rebuild folder children sets from parent pointers
    SweepTree,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    if let Err(e) = run(cli, config).await {
        tracing::error!("Fatal: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        "Starting CordVault v{} (env: {})",
        env!("CARGO_PKG_VERSION"),
        cli.env
    );

    let stores = Stores::from_config(&config.database).await?;

    tracing::info!(
        "Initializing blob backend (provider: {})...",
        config.storage.provider
    );
    let blobs = cordvault_storage::build_blob_store(&config.storage)?;

    let refresh = Arc::new(UrlRefreshService::new(
        Arc::clone(&stores.files),
        Arc::clone(&blobs),
    ));
    let orphans = Arc::new(OrphanReconciler::new(
        Arc::clone(&stores.files),
        Arc::clone(&blobs),
    ));
    let sweep = Arc::new(TreeConsistencySweep::new(Arc::clone(&stores.folders)));

    let mut executor = JobExecutor::new();
    executor.register(Arc::new(ReconciliationJobHandler::new(refresh, orphans)));
    executor.register(Arc::new(MaintenanceJobHandler::new(sweep)));
    let executor = Arc::new(executor);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, executor).await,
        Command::RefreshUrls { owner } => {
            wait_until_ready(blobs.as_ref()).await;
            let mut job = Job::new(RECONCILIATION_JOB, TASK_URL_REFRESH);
            if let Some(owner) = owner {
                job = job.with_arg("owner_id", serde_json::json!(owner));
            }
            run_once(&executor, job).await
        }
        Command::ReconcileOrphans => {
            wait_until_ready(blobs.as_ref()).await;
            run_once(
                &executor,
                Job::new(RECONCILIATION_JOB, TASK_ORPHAN_RECONCILIATION),
            )
            .await
        }
        Command::SweepTree => run_once(&executor, Job::new(MAINTENANCE_JOB, TASK_TREE_SWEEP)).await,
    }
}

/// Run the cron schedule until a shutdown signal arrives.
async fn serve(config: &AppConfig, executor: Arc<JobExecutor>) -> Result<(), AppError> {
    let scheduler = if config.worker.enabled {
        let scheduler = CronScheduler::new(Arc::clone(&executor)).await?;
        scheduler.register_default_tasks(&config.worker).await?;
        scheduler.start().await?;
        tracing::info!("Background worker started");
        Some(scheduler)
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    shutdown_signal().await;
    tracing::info!("Shutdown signal received");

    if let Some(mut scheduler) = scheduler {
        scheduler.shutdown().await?;
    }

    tracing::info!("CordVault shut down");
    Ok(())
}

/// Execute one job and print its result as JSON.
async fn run_once(executor: &JobExecutor, job: Job) -> Result<(), AppError> {
    let result = executor
        .execute(&job)
        .await
        .map_err(|e| AppError::internal(format!("{} failed: {}", job.task(), e)))?;

    let output = serde_json::to_string_pretty(&result.unwrap_or_default())?;
    println!("{}", output);
    Ok(())
}

/// The Discord backend connects in the background; give it a moment
/// before a one-shot command. The job itself reports a backend that never
/// came up.
async fn wait_until_ready(blobs: &dyn BlobStore) {
    let deadline = tokio::time::Instant::now() + READY_WAIT;
    while !blobs.is_ready() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
