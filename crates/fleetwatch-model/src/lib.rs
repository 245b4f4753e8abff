//! ---
//! fw_section: "02-domain-model"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Wire and domain types for fleet snapshots and scenarios."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
//! Domain types for the FleetWatch live-sync core.
//!
//! Everything here mirrors the backend wire contract: snapshots of moving
//! vehicles and customers, and scenario-level summaries. Records carry an
//! explicit kind tag through [`MapEntity`] so downstream consumers never have
//! to infer entity kind from which fields happen to be present.

pub mod entities;
pub mod scenario;
pub mod snapshot;

pub use entities::{Customer, MapEntity, MovementState, Position, Vehicle};
pub use scenario::{RunScenarioRequest, ScenarioMetrics, ScenarioSummary};
pub use snapshot::{FetchStatus, Snapshot};
