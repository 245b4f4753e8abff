//! ---
//! fw_section: "02-domain-model"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Wire and domain types for fleet snapshots and scenarios."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities::{Customer, MapEntity, Vehicle};

/// Outcome reported by the snapshot endpoint, or synthesised by the poller
/// when the endpoint cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Success,
    #[default]
    Empty,
    Error,
}

impl FetchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStatus::Success => "success",
            FetchStatus::Empty => "empty",
            FetchStatus::Error => "error",
        }
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One poll's complete state of vehicles and customers for a scenario.
///
/// Immutable once produced; each poll tick supersedes the previous snapshot
/// wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub status: FetchStatus,
    #[serde(default)]
    pub scenario_id: String,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Snapshot {
    /// Snapshot with no entities, reported as `empty`.
    pub fn empty(scenario_id: impl Into<String>) -> Self {
        Self {
            status: FetchStatus::Empty,
            scenario_id: scenario_id.into(),
            vehicles: Vec::new(),
            customers: Vec::new(),
            message: None,
        }
    }

    /// Error snapshot with no entities, for failures before any data exists.
    pub fn empty_error(message: impl Into<String>) -> Self {
        Self {
            status: FetchStatus::Error,
            scenario_id: String::new(),
            vehicles: Vec::new(),
            customers: Vec::new(),
            message: Some(message.into()),
        }
    }

    /// Copy of this snapshot with the status forced to `error`, carrying the
    /// entity collections unchanged. Used when serving cached data.
    pub fn degraded_copy(&self, message: impl Into<String>) -> Self {
        Self {
            status: FetchStatus::Error,
            message: Some(message.into()),
            ..self.clone()
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == FetchStatus::Success
    }

    pub fn entity_count(&self) -> usize {
        self.vehicles.len() + self.customers.len()
    }

    /// Iterate every record with its explicit kind tag, vehicles first.
    pub fn entities(&self) -> impl Iterator<Item = MapEntity<'_>> {
        self.vehicles
            .iter()
            .map(MapEntity::Vehicle)
            .chain(self.customers.iter().map(MapEntity::Customer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_decodes_backend_payload() {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "status": "success",
            "scenario_id": "s-1",
            "vehicles": [
                {"id": "v-1", "longitude": 11.58, "latitude": 48.13, "enroute": "idle"}
            ],
            "customers": [
                {"id": "c-1", "fake_name": "Ada L.", "longitude": 11.60, "latitude": 48.14}
            ]
        }))
        .unwrap();
        assert!(snapshot.is_success());
        assert_eq!(snapshot.entity_count(), 2);
        let ids: Vec<&str> = snapshot.entities().map(|entity| entity.id()).collect();
        assert_eq!(ids, vec!["v-1", "c-1"]);
    }

    #[test]
    fn degraded_copy_keeps_collections_and_forces_error() {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "status": "success",
            "scenario_id": "s-1",
            "vehicles": [
                {"id": "v-1", "longitude": 11.58, "latitude": 48.13}
            ],
            "customers": []
        }))
        .unwrap();
        let degraded = snapshot.degraded_copy("connection refused");
        assert_eq!(degraded.status, FetchStatus::Error);
        assert_eq!(degraded.vehicles, snapshot.vehicles);
        assert_eq!(degraded.message.as_deref(), Some("connection refused"));
        // The original is untouched.
        assert!(snapshot.is_success());
    }
}
