// =============================================================================
// Application State — latest snapshot for serve mode
// =============================================================================
//
// Holds the dashboard driver and the most recent snapshot. The refresh task
// and the `/refresh` endpoint both replace the snapshot; builds run one at a
// time so an older build never overwrites a newer one. Readers clone the
// `Arc` and never hold the lock across an await.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::info;

use crate::dashboard::{Dashboard, DashboardSnapshot};

pub struct AppState {
    /// Incremented every time a new snapshot is published.
    pub state_version: AtomicU64,
    pub dashboard: Dashboard,
    latest: RwLock<Option<Arc<DashboardSnapshot>>>,
    refresh_lock: Mutex<()>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            state_version: AtomicU64::new(0),
            dashboard,
            latest: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::Relaxed)
    }

    pub fn latest(&self) -> Option<Arc<DashboardSnapshot>> {
        self.latest.read().clone()
    }

    /// Rebuild the snapshot and publish it. Concurrent callers queue behind
    /// the build in progress.
    pub async fn refresh(&self) -> Arc<DashboardSnapshot> {
        let _building = self.refresh_lock.lock().await;
        let snapshot = Arc::new(self.dashboard.build_snapshot().await);
        *self.latest.write() = Some(snapshot.clone());
        let version = self.state_version.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            version,
            rows = snapshot.rows.len(),
            skipped = snapshot.skipped.len(),
            "snapshot published"
        );
        snapshot
    }
}
