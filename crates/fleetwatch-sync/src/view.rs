//! ---
//! fw_section: "05-live-sync"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Per-view polling, debounce and render lifecycle."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
use std::sync::Arc;
use std::time::Duration;

use fleetwatch_client::SnapshotSource;
use fleetwatch_common::PollingConfig;
use fleetwatch_model::{FetchStatus, Snapshot};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::metrics::SyncMetrics;
use crate::poll::SnapshotPoller;
use crate::project::project;
use crate::reconcile::{reconcile, MarkerRegistry};
use crate::schedule::{PollTimer, QuietWindow};
use crate::stale::{HealthLevel, StaleTracker, ViewHealth};
use crate::surface::RenderSurface;

/// Cadence knobs for one live view.
#[derive(Debug, Clone, Copy)]
pub struct LiveViewConfig {
    pub poll_interval: Duration,
    pub debounce_window: Duration,
    pub stale_threshold: u32,
}

impl Default for LiveViewConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2000),
            debounce_window: Duration::from_millis(100),
            stale_threshold: 3,
        }
    }
}

impl From<&PollingConfig> for LiveViewConfig {
    fn from(config: &PollingConfig) -> Self {
        Self {
            poll_interval: config.snapshot_interval_ms,
            debounce_window: config.debounce_window_ms,
            stale_threshold: config.stale_threshold,
        }
    }
}

/// One map view: a poller, a marker registry and an exclusively owned render
/// surface, driven as two cooperative tasks on the runtime.
///
/// The poll task fetches on a fixed cadence while a scenario is active and
/// hands each snapshot to the render task. The render task debounces: a
/// snapshot arms a quiet window, a newer arrival re-arms it, and only the
/// newest snapshot in a burst is reconciled onto the surface.
pub struct LiveView {
    source: Arc<dyn SnapshotSource>,
    scenario: watch::Receiver<Option<String>>,
    surface: Box<dyn RenderSurface>,
    config: LiveViewConfig,
    metrics: Option<SyncMetrics>,
}

impl LiveView {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        scenario: watch::Receiver<Option<String>>,
        surface: Box<dyn RenderSurface>,
    ) -> Self {
        Self {
            source,
            scenario,
            surface,
            config: LiveViewConfig::default(),
            metrics: None,
        }
    }

    pub fn with_config(mut self, config: LiveViewConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_metrics(mut self, metrics: SyncMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Start the poll and render tasks and return their lifecycle handle.
    pub fn spawn(self) -> ViewHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (health_tx, health_rx) = watch::channel(ViewHealth::default());
        let (snapshot_tx, snapshot_rx) = mpsc::unbounded_channel();

        let poll_task = tokio::spawn(poll_loop(
            self.source,
            self.scenario,
            self.config,
            self.metrics.clone(),
            snapshot_tx,
            health_tx,
            shutdown_rx.clone(),
        ));
        let render_task = tokio::spawn(render_loop(
            snapshot_rx,
            self.surface,
            self.config.debounce_window,
            self.metrics,
            shutdown_rx,
        ));

        ViewHandle {
            shutdown: shutdown_tx,
            health: health_rx,
            poll_task,
            render_task,
        }
    }
}

/// Handle for a running live view.
pub struct ViewHandle {
    shutdown: watch::Sender<bool>,
    health: watch::Receiver<ViewHealth>,
    poll_task: JoinHandle<()>,
    render_task: JoinHandle<()>,
}

impl ViewHandle {
    /// Subscribe to the stale-data indicator.
    pub fn health(&self) -> watch::Receiver<ViewHealth> {
        self.health.clone()
    }

    /// Signal shutdown, await both tasks and release the surface. No timer
    /// or snapshot callback runs after this returns.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        let _ = self.shutdown.send(true);
        self.poll_task.await.map_err(anyhow::Error::new)?;
        self.render_task.await.map_err(anyhow::Error::new)?;
        debug!("live view shutdown complete");
        Ok(())
    }
}

async fn poll_loop(
    source: Arc<dyn SnapshotSource>,
    scenario: watch::Receiver<Option<String>>,
    config: LiveViewConfig,
    metrics: Option<SyncMetrics>,
    snapshot_tx: mpsc::UnboundedSender<Snapshot>,
    health_tx: watch::Sender<ViewHealth>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut poller = SnapshotPoller::new(source);
    let mut tracker = StaleTracker::new(config.stale_threshold);
    let mut timer = PollTimer::new(config.poll_interval);
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                debug!("poll task shutdown");
                break;
            }
            _ = timer.tick() => {
                // "No active scenario" is a suspended state, not an error:
                // no request leaves the process while the id is absent.
                let active = scenario.borrow().clone();
                let Some(id) = active else { continue };
                let snapshot = poller.fetch(&id).await;
                let failed = snapshot.status == FetchStatus::Error;
                if let Some(metrics) = &metrics {
                    metrics.record_poll(failed);
                }
                publish_health(&health_tx, tracker.observe(failed));
                if snapshot_tx.send(snapshot).is_err() {
                    break;
                }
            }
        }
    }
}

fn publish_health(health_tx: &watch::Sender<ViewHealth>, health: ViewHealth) {
    let previous = *health_tx.borrow();
    if previous.level != health.level {
        match health.level {
            HealthLevel::Stale => warn!(
                consecutive_errors = health.consecutive_errors,
                "connection issues; rendering cached data"
            ),
            HealthLevel::Live => info!("snapshot feed recovered"),
        }
    }
    health_tx.send_replace(health);
}

async fn render_loop(
    mut snapshots: mpsc::UnboundedReceiver<Snapshot>,
    mut surface: Box<dyn RenderSurface>,
    window: Duration,
    metrics: Option<SyncMetrics>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut registry = MarkerRegistry::new();
    let mut quiet = QuietWindow::new(window);
    let mut pending: Option<Snapshot> = None;
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                debug!("render task shutdown");
                break;
            }
            received = snapshots.recv() => {
                match received {
                    Some(snapshot) => {
                        // Newest snapshot wins; restart the quiet window.
                        pending = Some(snapshot);
                        quiet.arm();
                    }
                    None => break,
                }
            }
            _ = quiet.elapsed(), if quiet.is_armed() => {
                quiet.disarm();
                if let Some(snapshot) = pending.take() {
                    render_pass(&snapshot, &mut registry, surface.as_mut(), metrics.as_ref());
                }
            }
        }
    }
    // Pending work is dropped with the loop; release the surface.
    surface.clear();
}

fn render_pass(
    snapshot: &Snapshot,
    registry: &mut MarkerRegistry,
    surface: &mut dyn RenderSurface,
    metrics: Option<&SyncMetrics>,
) {
    let plan = reconcile(registry, snapshot, surface, metrics);
    let routes = project(&snapshot.vehicles, &snapshot.customers);
    surface.set_pickup_routes(&routes.pickup);
    surface.set_destination_routes(&routes.destination);
    if let Some(metrics) = metrics {
        metrics.set_route_segments("pickup", routes.pickup.len());
        metrics.set_route_segments("destination", routes.destination.len());
    }
    debug!(
        scenario = %snapshot.scenario_id,
        status = %snapshot.status,
        created = plan.to_create.len(),
        updated = plan.to_update.len(),
        removed = plan.to_remove.len(),
        pickup_segments = routes.pickup.len(),
        destination_segments = routes.destination.len(),
        "reconciliation pass applied"
    );
}
