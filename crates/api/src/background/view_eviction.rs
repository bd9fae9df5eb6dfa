//! Periodic cleanup of abandoned dashboard views.
//!
//! Clients are expected to close their views, but a closed browser tab never
//! does. This task drops views that have not seen an interaction for a while.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::sessions::ViewSessionStore;

/// Views idle for this long are dropped.
pub const DEFAULT_MAX_IDLE: Duration = Duration::from_secs(30 * 60);

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Run the eviction loop until `cancel` is triggered.
pub async fn run(views: Arc<ViewSessionStore>, max_idle: Duration, cancel: CancellationToken) {
    tracing::info!(
        max_idle_secs = max_idle.as_secs(),
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "View eviction job started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("View eviction job stopping");
                break;
            }
            _ = interval.tick() => {
                let evicted = views.evict_idle(max_idle).await;
                if evicted > 0 {
                    let open = views.len().await;
                    tracing::info!(evicted, open, "Evicted idle views");
                } else {
                    tracing::debug!("View eviction: nothing to evict");
                }
            }
        }
    }
}
