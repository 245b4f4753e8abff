//! ---
//! fw_section: "01-core-functionality"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Shared primitives and utilities for the FleetWatch runtime."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use tracing::debug;

use crate::logging::LogFormat;

fn default_backend_url() -> String {
    "http://localhost:3333".to_owned()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_snapshot_interval() -> Duration {
    Duration::from_millis(2000)
}

fn default_metrics_interval() -> Duration {
    Duration::from_millis(5000)
}

fn default_debounce_window() -> Duration {
    Duration::from_millis(100)
}

fn default_stale_threshold() -> u32 {
    3
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

fn default_exporter_enabled() -> bool {
    false
}

fn default_exporter_listen() -> SocketAddr {
    "0.0.0.0:9798"
        .parse()
        .expect("valid default exporter address")
}

/// Primary configuration object for the FleetWatch runtime.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: PathBuf,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "FLEETWATCH_CONFIG";

    /// Load configuration from disk, respecting the `FLEETWATCH_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            let path = PathBuf::from(env_path);
            let config = Self::from_path(&path).with_context(|| {
                format!(
                    "failed to load configuration from {} override {}",
                    Self::ENV_CONFIG_PATH,
                    path.display()
                )
            })?;
            return Ok(LoadedAppConfig {
                config,
                source: path,
            });
        }
        for candidate in candidates {
            let path = candidate.as_ref();
            if path.exists() {
                let config = Self::from_path(path).with_context(|| {
                    format!("failed to load configuration from {}", path.display())
                })?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path.to_path_buf(),
                });
            }
            debug!(path = %path.display(), "configuration candidate not present");
        }
        Err(anyhow!(
            "no configuration file found; set {} or provide one of the candidate paths",
            Self::ENV_CONFIG_PATH
        ))
    }

    fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("unable to read {}", path.display()))?;
        let config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("unable to parse {}", path.display()))?;
        Ok(config)
    }
}

/// Connection settings for the fleet backend.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the snapshot/scenario backend.
    #[serde(default = "default_backend_url")]
    pub base_url: String,
    /// Per-request timeout applied to every backend call.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

/// Cadence settings for the live view and the session metrics task.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Fixed interval between snapshot fetches while a scenario is active.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval_ms: Duration,
    /// Fixed interval between scenario metrics fetches.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_metrics_interval")]
    pub metrics_interval_ms: Duration,
    /// Quiet window between snapshot arrival and reconciliation.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_debounce_window")]
    pub debounce_window_ms: Duration,
    /// Consecutive poll failures before the view reports stale data.
    #[serde(default = "default_stale_threshold")]
    pub stale_threshold: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            snapshot_interval_ms: default_snapshot_interval(),
            metrics_interval_ms: default_metrics_interval(),
            debounce_window_ms: default_debounce_window(),
            stale_threshold: default_stale_threshold(),
        }
    }
}

/// Logging sink configuration consumed by [`crate::logging::init_tracing`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory receiving the rolling daily log files.
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    /// Optional file name prefix; defaults to the service name.
    #[serde(default)]
    pub file_prefix: Option<String>,
    /// Stdout format.
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            file_prefix: None,
            format: default_log_format(),
        }
    }
}

/// Prometheus exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_exporter_enabled")]
    pub enabled: bool,
    #[serde(default = "default_exporter_listen")]
    pub listen: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_exporter_enabled(),
            listen: default_exporter_listen(),
        }
    }
}
