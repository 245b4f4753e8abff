//! ---
//! fw_section: "06-operator-daemon"
//! fw_subsection: "binary"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Binary entrypoint for the FleetWatch daemon."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fleetwatch_client::BackendClient;
use fleetwatch_common::config::AppConfig;
use fleetwatch_common::logging::init_tracing;
use fleetwatch_model::RunScenarioRequest;
use fleetwatch_session::SessionManager;
use fleetwatch_sync::{new_registry, spawn_http_server, LiveView, LiveViewConfig, SyncMetrics};
use tokio::signal;
use tracing::{info, warn};

mod console;

use console::ConsoleSurface;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "FleetWatch headless operator daemon",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Override the backend base URL")]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Attach to an already running scenario")]
    Attach {
        #[arg(long, value_name = "ID")]
        scenario: String,
    },
    #[command(about = "Launch a new scenario and watch it")]
    Launch {
        #[arg(long, default_value_t = 10)]
        customers: u32,
        #[arg(long, default_value_t = 5)]
        vehicles: u32,
        #[arg(long, default_value_t = 0.1)]
        breakdown_rate: f64,
    },
    #[command(about = "List known scenarios and exit")]
    History,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from("configs/fleetwatch.toml"));

    let mut config = match AppConfig::load_with_source(&candidates) {
        Ok(loaded) => {
            let config = loaded.config;
            init_tracing("fleetwatchd", &config.logging)?;
            info!(source = %loaded.source.display(), "configuration loaded");
            config
        }
        Err(err) => {
            let config = AppConfig::default();
            init_tracing("fleetwatchd", &config.logging)?;
            warn!(error = %err, "no configuration file; using built-in defaults");
            config
        }
    };
    if let Some(backend_url) = cli.backend_url {
        config.backend.base_url = backend_url;
    }

    let client =
        BackendClient::from_config(&config.backend).context("failed to construct backend client")?;
    info!(backend = %client.base_url(), "fleetwatchd starting");

    if let Some(Commands::History) = &cli.command {
        let scenarios = client.scenarios().await.context("failed to list scenarios")?;
        info!(count = scenarios.len(), "scenario history");
        for scenario in scenarios {
            println!(
                "{}  {:>10}  customers={:<4} vehicles={:<4} utilization={:.2} efficiency={:.2}",
                scenario.scenario_id,
                scenario.status,
                scenario.num_customers.unwrap_or_default(),
                scenario.num_vehicles.unwrap_or_default(),
                scenario.utilization,
                scenario.efficiency,
            );
        }
        return Ok(());
    }

    let (sync_metrics, metrics_server) = if config.metrics.enabled {
        let registry = new_registry();
        let metrics = SyncMetrics::new(registry.clone())
            .context("failed to register sync metrics")?;
        let server = spawn_http_server(registry, config.metrics.listen)
            .context("failed to start metrics exporter")?;
        (Some(metrics), Some(server))
    } else {
        (None, None)
    };

    let (session, session_task) =
        SessionManager::spawn(client.clone(), config.polling.metrics_interval_ms);

    match &cli.command {
        Some(Commands::Attach { scenario }) => {
            session.set_active_scenario(Some(scenario.clone()));
        }
        Some(Commands::Launch {
            customers,
            vehicles,
            breakdown_rate,
        }) => {
            let request = RunScenarioRequest {
                num_customers: *customers,
                num_vehicles: *vehicles,
                breakdown_rate: *breakdown_rate,
            };
            let summary = session
                .launch(&request)
                .await
                .context("failed to launch scenario")?;
            info!(scenario = %summary.scenario_id, "watching launched scenario");
        }
        Some(Commands::History) => unreachable!("handled above"),
        None => {
            info!("no scenario selected; waiting for activation (see --help)");
        }
    }

    let mut view = LiveView::new(
        Arc::new(client),
        session.subscribe_scenario(),
        Box::new(ConsoleSurface::new()),
    )
    .with_config(LiveViewConfig::from(&config.polling));
    if let Some(metrics) = sync_metrics {
        view = view.with_metrics(metrics);
    }
    let view_handle = view.spawn();

    // Narrate KPI updates so a headless operator still sees the dashboard
    // numbers move.
    let mut kpi_rx = session.subscribe_metrics();
    let kpi_task = tokio::spawn(async move {
        while kpi_rx.changed().await.is_ok() {
            let metrics = *kpi_rx.borrow();
            info!(
                utilization = metrics.utilization,
                efficiency = metrics.efficiency,
                "scenario KPIs updated"
            );
        }
    });

    signal::ctrl_c().await.context("failed to await ctrl-c")?;
    info!("shutdown requested");

    kpi_task.abort();
    view_handle.shutdown().await?;
    session_task.shutdown().await?;
    if let Some(server) = metrics_server {
        server.shutdown().await?;
    }
    info!("fleetwatchd shutdown complete");
    Ok(())
}
