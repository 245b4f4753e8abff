//! ---
//! fw_section: "02-domain-model"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Wire and domain types for fleet snapshots and scenarios."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scenario-level record returned by the `current_scenario` and `scenarios`
/// endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub status: String,
    pub scenario_id: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub num_customers: Option<u32>,
    #[serde(default)]
    pub num_vehicles: Option<u32>,
    #[serde(default)]
    pub savings_km_genetic: Option<f64>,
    #[serde(default)]
    pub savings_km_greedy: Option<f64>,
    #[serde(default)]
    pub savings_time_genetic: Option<f64>,
    #[serde(default)]
    pub savings_time_greedy: Option<f64>,
    #[serde(default)]
    pub utilization: f64,
    #[serde(default)]
    pub efficiency: f64,
}

impl ScenarioSummary {
    /// Aggregate KPIs published to dashboard subscribers.
    ///
    /// The optimiser's genetic savings figures take precedence over the plain
    /// utilization/efficiency columns when present, matching what the
    /// reference dashboard displayed.
    pub fn metrics(&self) -> ScenarioMetrics {
        ScenarioMetrics {
            utilization: self.savings_km_genetic.unwrap_or(self.utilization),
            efficiency: self.savings_time_genetic.unwrap_or(self.efficiency),
            observed_at: Utc::now(),
        }
    }
}

/// Aggregate KPI pair published by the session manager.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    pub utilization: f64,
    pub efficiency: f64,
    pub observed_at: DateTime<Utc>,
}

impl Default for ScenarioMetrics {
    fn default() -> Self {
        Self {
            utilization: 0.0,
            efficiency: 0.0,
            observed_at: Utc::now(),
        }
    }
}

/// Parameters for launching a new simulation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunScenarioRequest {
    pub num_customers: u32,
    pub num_vehicles: u32,
    pub breakdown_rate: f64,
}

impl Default for RunScenarioRequest {
    fn default() -> Self {
        Self {
            num_customers: 10,
            num_vehicles: 5,
            breakdown_rate: 0.1,
        }
    }
}
