//! ---
//! fw_section: "05-live-sync"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Prometheus instrumentation for the sync engine."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, StatusCode};
use axum::routing::get;
use axum::{response::IntoResponse, Router};
use prometheus::{Encoder, IntCounter, IntGaugeVec, Opts, Registry, TextEncoder};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::reconcile::ReconcilePlan;

/// Shared registry type used across services.
pub type SharedRegistry = Arc<Registry>;

/// Produce a new shared registry.
pub fn new_registry() -> SharedRegistry {
    Arc::new(Registry::new())
}

/// Counters recorded by the live-sync engine, threaded as an `Option` so
/// instrumentation stays optional per view.
#[derive(Clone)]
pub struct SyncMetrics {
    polls_total: IntCounter,
    poll_failures_total: IntCounter,
    reconcile_passes_total: IntCounter,
    markers_created_total: IntCounter,
    markers_updated_total: IntCounter,
    markers_removed_total: IntCounter,
    route_segments: IntGaugeVec,
}

impl SyncMetrics {
    pub fn new(registry: SharedRegistry) -> Result<Self> {
        let polls_total = IntCounter::with_opts(Opts::new(
            "fleetwatch_polls_total",
            "Total snapshot fetches attempted by live views",
        ))?;
        registry.register(Box::new(polls_total.clone()))?;

        let poll_failures_total = IntCounter::with_opts(Opts::new(
            "fleetwatch_poll_failures_total",
            "Snapshot fetches that returned an error status",
        ))?;
        registry.register(Box::new(poll_failures_total.clone()))?;

        let reconcile_passes_total = IntCounter::with_opts(Opts::new(
            "fleetwatch_reconcile_passes_total",
            "Reconciliation passes applied to a render surface",
        ))?;
        registry.register(Box::new(reconcile_passes_total.clone()))?;

        let markers_created_total = IntCounter::with_opts(Opts::new(
            "fleetwatch_markers_created_total",
            "Markers created on render surfaces",
        ))?;
        registry.register(Box::new(markers_created_total.clone()))?;

        let markers_updated_total = IntCounter::with_opts(Opts::new(
            "fleetwatch_markers_updated_total",
            "Markers updated in place on render surfaces",
        ))?;
        registry.register(Box::new(markers_updated_total.clone()))?;

        let markers_removed_total = IntCounter::with_opts(Opts::new(
            "fleetwatch_markers_removed_total",
            "Markers removed from render surfaces",
        ))?;
        registry.register(Box::new(markers_removed_total.clone()))?;

        let route_segments = IntGaugeVec::new(
            Opts::new(
                "fleetwatch_route_segments",
                "Route segments currently drawn, by line layer",
            ),
            &["layer"],
        )?;
        registry.register(Box::new(route_segments.clone()))?;

        Ok(Self {
            polls_total,
            poll_failures_total,
            reconcile_passes_total,
            markers_created_total,
            markers_updated_total,
            markers_removed_total,
            route_segments,
        })
    }

    pub fn record_poll(&self, failed: bool) {
        self.polls_total.inc();
        if failed {
            self.poll_failures_total.inc();
        }
    }

    pub fn record_pass(&self, plan: &ReconcilePlan) {
        self.reconcile_passes_total.inc();
        self.markers_created_total.inc_by(plan.to_create.len() as u64);
        self.markers_updated_total.inc_by(plan.to_update.len() as u64);
        self.markers_removed_total.inc_by(plan.to_remove.len() as u64);
    }

    pub fn set_route_segments(&self, layer: &str, count: usize) {
        self.route_segments
            .with_label_values(&[layer])
            .set(count as i64);
    }
}

/// Spawn an HTTP server that exposes the registry at `/metrics`.
pub fn spawn_http_server(registry: SharedRegistry, addr: SocketAddr) -> Result<MetricsServer> {
    let app = Router::new().route(
        "/metrics",
        get({
            let registry = registry.clone();
            move || metrics_handler(registry.clone())
        }),
    );

    let std_listener = StdTcpListener::bind(addr)
        .with_context(|| format!("failed to bind metrics listener {}", addr))?;
    std_listener
        .set_nonblocking(true)
        .with_context(|| "failed to configure metrics listener as non-blocking")?;
    let listener = TcpListener::from_std(std_listener)
        .with_context(|| "failed to convert std listener into tokio listener")?;

    info!(address = %addr, "metrics server starting");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let service = app.into_make_service();
    let handle: JoinHandle<Result<()>> = tokio::spawn(async move {
        axum::serve(listener, service)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
            .context("metrics server encountered an error")?;
        Ok(())
    });

    Ok(MetricsServer {
        addr,
        shutdown: Some(shutdown_tx),
        task: handle,
    })
}

async fn metrics_handler(registry: SharedRegistry) -> impl IntoResponse {
    let families = registry.gather();
    let encoder = TextEncoder::new();
    match encoder.encode_to_string(&families) {
        Ok(body) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_str(encoder.format_type())
                    .unwrap_or_else(|_| HeaderValue::from_static("text/plain; charset=utf-8")),
            )],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("metrics encoding error"),
            )
                .into_response()
        }
    }
}

/// Handle to the running HTTP exporter.
#[derive(Debug)]
pub struct MetricsServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl MetricsServer {
    /// Return the bound address for convenience.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Signal shutdown and await task completion.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(err),
            Err(join_err) => Err(anyhow::Error::new(join_err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{MarkerKind, MarkerSpec};
    use fleetwatch_model::Position;

    #[test]
    fn pass_counters_follow_the_plan() {
        let registry = new_registry();
        let metrics = SyncMetrics::new(registry.clone()).unwrap();
        let plan = ReconcilePlan {
            to_create: vec![MarkerSpec {
                id: "v-1".into(),
                kind: MarkerKind::Customer,
                position: Position::new(0.0, 0.0),
            }],
            to_update: Vec::new(),
            to_remove: vec!["c-9".into()],
        };
        metrics.record_pass(&plan);
        metrics.record_poll(true);

        let families = registry.gather();
        let value = |name: &str| {
            families
                .iter()
                .find(|family| family.get_name() == name)
                .map(|family| family.get_metric()[0].get_counter().get_value())
                .unwrap_or_default()
        };
        assert_eq!(value("fleetwatch_markers_created_total"), 1.0);
        assert_eq!(value("fleetwatch_markers_removed_total"), 1.0);
        assert_eq!(value("fleetwatch_poll_failures_total"), 1.0);
    }
}
