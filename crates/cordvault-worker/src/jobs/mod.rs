//! Built-in job handler implementations.

pub mod maintenance;
pub mod reconciliation;

pub use maintenance::MaintenanceJobHandler;
pub use reconciliation::ReconciliationJobHandler;
