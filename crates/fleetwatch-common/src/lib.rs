//! ---
//! fw_section: "01-core-functionality"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Shared primitives and utilities for the FleetWatch runtime."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
//! Shared primitives for the FleetWatch workspace.
//! This crate exposes configuration loading and logging bootstrap utilities
//! consumed by every other workspace member.

pub mod config;
pub mod logging;

pub use config::{
    AppConfig, BackendConfig, LoadedAppConfig, LoggingConfig, MetricsConfig, PollingConfig,
};
pub use logging::{init_tracing, LogFormat};
