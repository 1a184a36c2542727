//! Scheduled background work for CordVault.
//!
//! This crate provides:
//! - A job executor that dispatches jobs to the correct handler
//! - Handlers for URL refresh, orphan reconciliation and the folder tree sweep
//! - A cron scheduler that fires those jobs on the configured cadence

pub mod executor;
pub mod job;
pub mod jobs;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, JobHandler};
pub use job::Job;
pub use scheduler::CronScheduler;
