//! ---
//! fw_section: "05-live-sync"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Snapshot polling with a last-known-good cache."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
use std::sync::Arc;

use fleetwatch_client::SnapshotSource;
use fleetwatch_model::Snapshot;
use tracing::warn;

/// Fetches snapshots for an active scenario and degrades to cached data when
/// the backend is unreachable.
///
/// The cache is owned by this instance (one per view), so independent views
/// and tests never interfere. [`SnapshotPoller::fetch`] never fails: callers
/// always receive a renderable snapshot and can track error-status streaks
/// separately to drive a stale-data indicator.
pub struct SnapshotPoller {
    source: Arc<dyn SnapshotSource>,
    last_good: Option<Snapshot>,
}

impl SnapshotPoller {
    pub fn new(source: Arc<dyn SnapshotSource>) -> Self {
        Self {
            source,
            last_good: None,
        }
    }

    /// Fetch a snapshot for the scenario.
    ///
    /// A successful decode becomes the new last-known-good cache and is
    /// returned unmodified; `empty` and server-reported `error` payloads pass
    /// through without touching the cache. A transport or protocol failure is
    /// converted into a copy of the cache with status forced to `error` (or
    /// an empty error snapshot when no cache exists yet).
    pub async fn fetch(&mut self, scenario_id: &str) -> Snapshot {
        match self.source.snapshot(scenario_id).await {
            Ok(snapshot) => {
                if snapshot.is_success() {
                    self.last_good = Some(snapshot.clone());
                }
                snapshot
            }
            Err(err) => {
                warn!(
                    scenario = %scenario_id,
                    error = %err,
                    "snapshot fetch failed; serving cached data"
                );
                match &self.last_good {
                    Some(cached) => cached.degraded_copy(err.to_string()),
                    None => Snapshot::empty_error(err.to_string()),
                }
            }
        }
    }

    /// The retained last successful snapshot, if any.
    pub fn last_known_good(&self) -> Option<&Snapshot> {
        self.last_good.as_ref()
    }
}
