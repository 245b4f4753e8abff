//! ---
//! fw_section: "03-networking-external-interfaces"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Backend connectivity for snapshots and scenarios."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
use std::time::Duration;

use async_trait::async_trait;
use fleetwatch_common::BackendConfig;
use fleetwatch_model::{RunScenarioRequest, ScenarioSummary, Snapshot};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::ClientError;

/// Source of snapshots for a live view. The production implementation is
/// [`BackendClient`]; tests substitute scripted sources.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn snapshot(&self, scenario_id: &str) -> Result<Snapshot, ClientError>;
}

/// Cloneable handle over the fleet backend HTTP API.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base: Url,
}

#[derive(Debug, Deserialize)]
struct ScenarioList {
    scenarios: Vec<ScenarioSummary>,
}

impl BackendClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, ClientError> {
        let base = Url::parse(base_url).map_err(|source| ClientError::InvalidUrl {
            url: base_url.to_owned(),
            source,
        })?;
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self { http, base })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, ClientError> {
        Self::new(&config.base_url, config.request_timeout_ms)
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Fetch the current map state for a scenario.
    pub async fn map_state(&self, scenario_id: &str) -> Result<Snapshot, ClientError> {
        let url = self.join("map_state", "map_state/")?;
        let response = self
            .http
            .get(url)
            .query(&[("scenario_id", scenario_id)])
            .send()
            .await?;
        decode("map_state", response).await
    }

    /// Fetch the scenario-level summary, optionally pinned to a scenario id.
    pub async fn current_scenario(
        &self,
        scenario_id: Option<&str>,
    ) -> Result<ScenarioSummary, ClientError> {
        let url = self.join("current_scenario", "current_scenario")?;
        let mut request = self.http.get(url);
        if let Some(id) = scenario_id {
            request = request.query(&[("scenario_id", id)]);
        }
        let response = request.send().await?;
        decode("current_scenario", response).await
    }

    /// Launch a new simulation run and return its summary; the scenario id in
    /// the summary identifies the newly created run.
    pub async fn run_scenario(
        &self,
        request: &RunScenarioRequest,
    ) -> Result<ScenarioSummary, ClientError> {
        let path = format!(
            "run_scenario/{}/{}/{}",
            request.num_customers, request.num_vehicles, request.breakdown_rate
        );
        let url = self.join("run_scenario", &path)?;
        debug!(
            customers = request.num_customers,
            vehicles = request.num_vehicles,
            breakdown_rate = request.breakdown_rate,
            "launching scenario"
        );
        let response = self.http.post(url).send().await?;
        decode("run_scenario", response).await
    }

    /// List all known scenarios for historical display.
    pub async fn scenarios(&self) -> Result<Vec<ScenarioSummary>, ClientError> {
        let url = self.join("scenarios", "scenarios")?;
        let response = self.http.get(url).send().await?;
        let list: ScenarioList = decode("scenarios", response).await?;
        Ok(list.scenarios)
    }

    fn join(&self, endpoint: &'static str, path: &str) -> Result<Url, ClientError> {
        self.base.join(path).map_err(|source| ClientError::InvalidUrl {
            url: format!("{}/{}", self.base, endpoint),
            source,
        })
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    endpoint: &'static str,
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Protocol { endpoint, status });
    }
    response
        .json()
        .await
        .map_err(|source| ClientError::Decode { endpoint, source })
}

#[async_trait]
impl SnapshotSource for BackendClient {
    async fn snapshot(&self, scenario_id: &str) -> Result<Snapshot, ClientError> {
        self.map_state(scenario_id).await
    }
}
