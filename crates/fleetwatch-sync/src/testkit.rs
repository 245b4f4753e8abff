//! ---
//! fw_section: "05-live-sync"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Scripted snapshot sources for engine tests."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
//! Scripted [`SnapshotSource`] used by the engine's own tests and by the
//! workspace integration suite. Not wired into any production path.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use fleetwatch_client::{ClientError, SnapshotSource, StatusCode};
use fleetwatch_model::Snapshot;
use parking_lot::Mutex;

enum ScriptedResponse {
    Ok(Snapshot),
    Err,
}

/// Snapshot source that replays a scripted sequence of responses.
///
/// An exhausted script answers with a protocol error, so a misbehaving loop
/// degrades instead of hanging the test.
#[derive(Default)]
pub struct ScriptedSource {
    queue: Mutex<VecDeque<ScriptedResponse>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, snapshot: Snapshot) {
        self.queue.lock().push_back(ScriptedResponse::Ok(snapshot));
    }

    pub fn push_err(&self) {
        self.queue.lock().push_back(ScriptedResponse::Err);
    }

    /// Number of fetches issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for ScriptedSource {
    async fn snapshot(&self, _scenario_id: &str) -> Result<Snapshot, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.queue.lock().pop_front();
        match next {
            Some(ScriptedResponse::Ok(snapshot)) => Ok(snapshot),
            Some(ScriptedResponse::Err) | None => Err(ClientError::Protocol {
                endpoint: "map_state",
                status: StatusCode::SERVICE_UNAVAILABLE,
            }),
        }
    }
}
