//! ---
//! fw_section: "04-session-orchestration"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Scenario session lifecycle and KPI publication."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
use std::sync::Arc;
use std::time::Duration;

use fleetwatch_client::{BackendClient, ClientError};
use fleetwatch_model::{RunScenarioRequest, ScenarioMetrics, ScenarioSummary};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

struct SessionShared {
    client: BackendClient,
    scenario_tx: watch::Sender<Option<String>>,
    metrics_tx: watch::Sender<ScenarioMetrics>,
}

/// Shared handle onto the scenario session.
///
/// All writes to the active scenario id flow through this handle's setters;
/// views and pollers only ever hold [`watch::Receiver`] subscriptions.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<SessionShared>,
}

impl SessionHandle {
    /// Set (or clear) the active scenario. An empty id counts as absent, so
    /// dependent pollers observe "inactive" and suspend fetching.
    pub fn set_active_scenario<S: Into<String>>(&self, id: Option<S>) {
        let normalized = id.map(Into::into).filter(|value| !value.is_empty());
        self.inner.scenario_tx.send_if_modified(|current| {
            if *current == normalized {
                return false;
            }
            match &normalized {
                Some(id) => info!(scenario = %id, "scenario activated"),
                None => info!("scenario cleared; polling suspended"),
            }
            *current = normalized.clone();
            true
        });
    }

    pub fn clear_active_scenario(&self) {
        self.set_active_scenario::<String>(None);
    }

    pub fn active_scenario(&self) -> Option<String> {
        self.inner.scenario_tx.borrow().clone()
    }

    /// Subscribe to active-scenario changes.
    pub fn subscribe_scenario(&self) -> watch::Receiver<Option<String>> {
        self.inner.scenario_tx.subscribe()
    }

    /// Subscribe to scenario-level KPI updates. On fetch failure the last
    /// published value is retained, so subscribers never observe a blank.
    pub fn subscribe_metrics(&self) -> watch::Receiver<ScenarioMetrics> {
        self.inner.metrics_tx.subscribe()
    }

    pub fn latest_metrics(&self) -> ScenarioMetrics {
        *self.inner.metrics_tx.borrow()
    }

    /// Launch a new simulation run and adopt the returned scenario id as the
    /// active one.
    pub async fn launch(
        &self,
        request: &RunScenarioRequest,
    ) -> Result<ScenarioSummary, ClientError> {
        let summary = self.inner.client.run_scenario(request).await?;
        info!(
            scenario = %summary.scenario_id,
            customers = request.num_customers,
            vehicles = request.num_vehicles,
            "scenario launched"
        );
        self.set_active_scenario(Some(summary.scenario_id.clone()));
        Ok(summary)
    }

    /// All known scenarios, for historical display. Read-only passthrough.
    pub async fn history(&self) -> Result<Vec<ScenarioSummary>, ClientError> {
        self.inner.client.scenarios().await
    }
}

/// Spawns and owns the scenario metrics polling task.
pub struct SessionManager;

impl SessionManager {
    /// Create the shared session handle and start the KPI polling task.
    pub fn spawn(client: BackendClient, metrics_interval: Duration) -> (SessionHandle, SessionTask) {
        let (scenario_tx, _) = watch::channel(None);
        let (metrics_tx, _) = watch::channel(ScenarioMetrics::default());
        let shared = Arc::new(SessionShared {
            client,
            scenario_tx,
            metrics_tx,
        });
        let handle = SessionHandle {
            inner: shared.clone(),
        };
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(metrics_loop(shared, metrics_interval, shutdown_rx));
        (
            handle,
            SessionTask {
                shutdown: shutdown_tx,
                task,
            },
        )
    }
}

/// Handle for the running metrics task.
pub struct SessionTask {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SessionTask {
    /// Signal shutdown and await task completion.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        let _ = self.shutdown.send(true);
        self.task.await.map_err(anyhow::Error::new)
    }
}

async fn metrics_loop(
    shared: Arc<SessionShared>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut scenario_rx = shared.scenario_tx.subscribe();
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                debug!("session metrics task shutdown");
                break;
            }
            changed = scenario_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                // Refresh immediately on activation instead of waiting a full
                // interval.
                let active = scenario_rx.borrow_and_update().clone();
                if let Some(id) = active {
                    refresh_metrics(&shared, &id).await;
                }
            }
            _ = ticker.tick() => {
                let active = shared.scenario_tx.borrow().clone();
                let Some(id) = active else { continue };
                refresh_metrics(&shared, &id).await;
            }
        }
    }
}

async fn refresh_metrics(shared: &SessionShared, scenario_id: &str) {
    match shared.client.current_scenario(Some(scenario_id)).await {
        Ok(summary) => {
            let metrics = summary.metrics();
            debug!(
                scenario = %scenario_id,
                utilization = metrics.utilization,
                efficiency = metrics.efficiency,
                "scenario metrics refreshed"
            );
            shared.metrics_tx.send_replace(metrics);
        }
        Err(err) => {
            warn!(
                scenario = %scenario_id,
                error = %err,
                "scenario metrics fetch failed; keeping last published values"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle_without_task() -> SessionHandle {
        let client = BackendClient::new("http://127.0.0.1:9", Duration::from_millis(100)).unwrap();
        let (scenario_tx, _) = watch::channel(None);
        let (metrics_tx, _) = watch::channel(ScenarioMetrics::default());
        SessionHandle {
            inner: Arc::new(SessionShared {
                client,
                scenario_tx,
                metrics_tx,
            }),
        }
    }

    #[test]
    fn empty_id_counts_as_absent() {
        let handle = handle_without_task();
        handle.set_active_scenario(Some("s-1"));
        assert_eq!(handle.active_scenario().as_deref(), Some("s-1"));
        handle.set_active_scenario(Some(""));
        assert_eq!(handle.active_scenario(), None);
    }

    #[test]
    fn subscribers_observe_activation() {
        let handle = handle_without_task();
        let mut rx = handle.subscribe_scenario();
        assert!(!rx.has_changed().unwrap());
        handle.set_active_scenario(Some("s-2"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_deref(), Some("s-2"));
    }

    #[test]
    fn redundant_set_does_not_notify() {
        let handle = handle_without_task();
        handle.set_active_scenario(Some("s-3"));
        let mut rx = handle.subscribe_scenario();
        handle.set_active_scenario(Some("s-3"));
        assert!(!rx.has_changed().unwrap());
    }
}
