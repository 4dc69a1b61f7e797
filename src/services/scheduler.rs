use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::services::sync_service::SyncService;

/// Periodic catalog refresh, so the admin view tracks changes other
/// admins make server-side. Each tick is an ordinary `refresh`; if a
/// manual refresh overlaps a scheduled one, the engine's ticket rule
/// decides which result lands.
pub struct RefreshScheduler {
    engine: Arc<SyncService>,
    interval: Duration,
}

impl RefreshScheduler {
    pub fn new(engine: Arc<SyncService>, interval_secs: u64) -> Self {
        Self {
            engine,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Refreshes in an endless loop. A failed tick is logged and the loop
    /// carries on; the engine keeps its last good collection either way.
    pub async fn start(self) {
        info!("starting auto-refresh scheduler (interval: {:?})", self.interval);

        loop {
            tokio::time::sleep(self.interval).await;

            match self.engine.refresh().await {
                Ok(courses) => {
                    info!("auto-refresh completed: {} courses", courses.len());
                }
                Err(e) => {
                    warn!("auto-refresh failed: {:?}", e);
                }
            }
        }
    }
}
