pub mod sync_service;
pub mod scheduler;

pub use sync_service::{DEFAULT_SUCCESS_TTL, PendingOp, SyncService};
pub use scheduler::RefreshScheduler;
