//! ---
//! fw_section: "05-live-sync"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Live entity synchronization and map reconciliation engine."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
//! The live-sync engine behind FleetWatch map views.
//!
//! A [`view::LiveView`] polls snapshots for the active scenario, degrades to
//! cached data under failure, and reconciles each snapshot onto a
//! [`surface::RenderSurface`] as keyed marker deltas plus wholesale
//! route-layer replacements. Which visual library backs the surface is not
//! this crate's concern.

pub mod metrics;
pub mod poll;
pub mod project;
pub mod reconcile;
pub mod schedule;
pub mod stale;
pub mod surface;
pub mod testkit;
pub mod view;

pub use metrics::{new_registry, spawn_http_server, MetricsServer, SharedRegistry, SyncMetrics};
pub use poll::SnapshotPoller;
pub use project::{project, RouteSegment, RouteSet};
pub use reconcile::{
    desired_markers, destination_marker_id, diff, reconcile, MarkerRegistry, ReconcilePlan,
};
pub use stale::{HealthLevel, StaleTracker, ViewHealth};
pub use surface::{
    DeferredSurface, MarkerId, MarkerKind, MarkerSpec, RecordingSurface, RenderSurface,
};
pub use view::{LiveView, LiveViewConfig, ViewHandle};
