//! ---
//! fw_section: "06-operator-daemon"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Log-backed render surface for headless operation."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
use fleetwatch_sync::{MarkerSpec, RenderSurface, RouteSegment};
use tracing::{debug, info};

/// Render surface that narrates marker and route operations to the log
/// stream instead of drawing them. Lets the daemon exercise the full
/// reconciliation path with no map widget attached.
#[derive(Debug, Default)]
pub struct ConsoleSurface;

impl ConsoleSurface {
    pub fn new() -> Self {
        Self
    }
}

impl RenderSurface for ConsoleSurface {
    fn add_marker(&mut self, spec: &MarkerSpec) {
        info!(
            id = %spec.id,
            kind = ?spec.kind,
            position = %spec.position,
            tint = spec.kind.tint(),
            "marker added"
        );
    }

    fn update_marker(&mut self, spec: &MarkerSpec) {
        debug!(id = %spec.id, position = %spec.position, "marker moved");
    }

    fn remove_marker(&mut self, id: &str) {
        info!(id = %id, "marker removed");
    }

    fn set_pickup_routes(&mut self, segments: &[RouteSegment]) {
        debug!(segments = segments.len(), "pickup route layer replaced");
    }

    fn set_destination_routes(&mut self, segments: &[RouteSegment]) {
        debug!(segments = segments.len(), "destination route layer replaced");
    }

    fn clear(&mut self) {
        info!("render surface released");
    }
}
