//! Background procedures that bring local metadata back into agreement
//! with the blob backend and repair folder-tree drift.

pub mod login_hook;
pub mod orphan;
pub mod tree_sweep;
pub mod url_refresh;

pub use login_hook::PostLoginRefresh;
pub use orphan::{OrphanReconciler, OrphanReport};
pub use tree_sweep::{TreeConsistencySweep, TreeSweepReport};
pub use url_refresh::UrlRefreshService;
