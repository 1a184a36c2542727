//! # cordvault-service
//!
//! Business logic for CordVault: the folder tree, the file lifecycle, and
//! the reconciliation procedures that keep metadata in step with the blob
//! backend.
//!
//! Services follow constructor injection; every store and the blob
//! backend are passed in as `Arc<dyn ..>` at construction time. Every
//! user-facing call takes the acting owner explicitly.

pub mod file;
pub mod folder;
pub mod reconcile;

pub use file::{DownloadService, FileDownload, FileService, UploadRequest, UploadService};
pub use folder::{FolderService, TreeService};
pub use reconcile::{
    OrphanReconciler, OrphanReport, PostLoginRefresh, TreeConsistencySweep, TreeSweepReport,
    UrlRefreshService,
};
