//! ---
//! fw_section: "05-live-sync"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Render surface contract for markers and route layers."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
use std::sync::Arc;

use fleetwatch_model::{MovementState, Position};
use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::project::RouteSegment;

/// Key into the marker registry: a vehicle id, a customer id, or a derived
/// destination id.
pub type MarkerId = String;

/// Explicit tag for what a marker depicts. Rendering style derives from the
/// tag, never from field sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Vehicle { state: MovementState },
    Customer,
    Destination,
}

impl MarkerKind {
    /// Dot colour, matching the reference dashboard palette.
    pub fn tint(&self) -> &'static str {
        match self {
            MarkerKind::Vehicle {
                state: MovementState::Idle,
            } => "#FFC107",
            MarkerKind::Vehicle {
                state: MovementState::ToCustomer,
            } => "#2196F3",
            MarkerKind::Vehicle {
                state: MovementState::ToDestination,
            } => "#4CAF50",
            MarkerKind::Customer => "#9E9E9E",
            MarkerKind::Destination => "#616161",
        }
    }

    /// Dot diameter in pixels; destinations render smaller.
    pub fn size_px(&self) -> u32 {
        match self {
            MarkerKind::Destination => 8,
            _ => 12,
        }
    }

    /// Stacking order: vehicles above customers above destinations.
    pub fn z_order(&self) -> u32 {
        match self {
            MarkerKind::Vehicle { .. } => 1000,
            MarkerKind::Customer => 100,
            MarkerKind::Destination => 50,
        }
    }
}

/// Everything a surface needs to draw (or re-draw) one point marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub id: MarkerId,
    pub kind: MarkerKind,
    pub position: Position,
}

/// Contract the reconciliation engine holds against the visual map component.
///
/// Implementations must tolerate redundant `remove_marker` calls for ids that
/// are already absent, and must never fail a call; a surface that is not yet
/// initialised should queue or drop operations (see [`DeferredSurface`]).
pub trait RenderSurface: Send {
    fn add_marker(&mut self, spec: &MarkerSpec);
    fn update_marker(&mut self, spec: &MarkerSpec);
    fn remove_marker(&mut self, id: &str);
    /// Replace the whole pickup-route line layer.
    fn set_pickup_routes(&mut self, segments: &[RouteSegment]);
    /// Replace the whole destination-route line layer.
    fn set_destination_routes(&mut self, segments: &[RouteSegment]);
    /// Release every marker and line layer.
    fn clear(&mut self);
}

enum SurfaceOp {
    Add(MarkerSpec),
    Update(MarkerSpec),
    Remove(MarkerId),
    PickupRoutes(Vec<RouteSegment>),
    DestinationRoutes(Vec<RouteSegment>),
    Clear,
}

/// Wrapper that queues operations until the underlying surface reports ready.
///
/// Map widgets typically finish initialising a beat after the first snapshot
/// lands; buffering here means callers never have to care.
pub struct DeferredSurface<S> {
    inner: S,
    ready: bool,
    queued: Vec<SurfaceOp>,
}

impl<S: RenderSurface> DeferredSurface<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            ready: false,
            queued: Vec::new(),
        }
    }

    /// Mark the underlying surface as initialised and flush queued operations
    /// in arrival order.
    pub fn ready(&mut self) {
        self.ready = true;
        for op in self.queued.drain(..) {
            match op {
                SurfaceOp::Add(spec) => self.inner.add_marker(&spec),
                SurfaceOp::Update(spec) => self.inner.update_marker(&spec),
                SurfaceOp::Remove(id) => self.inner.remove_marker(&id),
                SurfaceOp::PickupRoutes(segments) => self.inner.set_pickup_routes(&segments),
                SurfaceOp::DestinationRoutes(segments) => {
                    self.inner.set_destination_routes(&segments)
                }
                SurfaceOp::Clear => self.inner.clear(),
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: RenderSurface> RenderSurface for DeferredSurface<S> {
    fn add_marker(&mut self, spec: &MarkerSpec) {
        if self.ready {
            self.inner.add_marker(spec);
        } else {
            self.queued.push(SurfaceOp::Add(spec.clone()));
        }
    }

    fn update_marker(&mut self, spec: &MarkerSpec) {
        if self.ready {
            self.inner.update_marker(spec);
        } else {
            self.queued.push(SurfaceOp::Update(spec.clone()));
        }
    }

    fn remove_marker(&mut self, id: &str) {
        if self.ready {
            self.inner.remove_marker(id);
        } else {
            self.queued.push(SurfaceOp::Remove(id.to_owned()));
        }
    }

    fn set_pickup_routes(&mut self, segments: &[RouteSegment]) {
        if self.ready {
            self.inner.set_pickup_routes(segments);
        } else {
            self.queued.push(SurfaceOp::PickupRoutes(segments.to_vec()));
        }
    }

    fn set_destination_routes(&mut self, segments: &[RouteSegment]) {
        if self.ready {
            self.inner.set_destination_routes(segments);
        } else {
            self.queued
                .push(SurfaceOp::DestinationRoutes(segments.to_vec()));
        }
    }

    fn clear(&mut self) {
        if self.ready {
            self.inner.clear();
        } else {
            self.queued.push(SurfaceOp::Clear);
        }
    }
}

/// Observable state captured by [`RecordingSurface`].
#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub markers: IndexMap<MarkerId, MarkerSpec>,
    pub pickup_routes: Vec<RouteSegment>,
    pub destination_routes: Vec<RouteSegment>,
    pub creates: usize,
    pub updates: usize,
    pub removes: usize,
    pub route_replacements: usize,
    pub clears: usize,
}

/// Surface double that records every operation for assertions. Shared behind
/// an [`Arc`] so a test can keep inspecting after handing the surface to a
/// view task.
#[derive(Clone, Default)]
pub struct RecordingSurface {
    state: Arc<Mutex<Recorded>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the recorded state at this instant.
    pub fn recorded(&self) -> Recorded {
        self.state.lock().clone()
    }

    pub fn marker_ids(&self) -> Vec<MarkerId> {
        self.state.lock().markers.keys().cloned().collect()
    }
}

impl RenderSurface for RecordingSurface {
    fn add_marker(&mut self, spec: &MarkerSpec) {
        let mut state = self.state.lock();
        state.creates += 1;
        state.markers.insert(spec.id.clone(), spec.clone());
    }

    fn update_marker(&mut self, spec: &MarkerSpec) {
        let mut state = self.state.lock();
        state.updates += 1;
        state.markers.insert(spec.id.clone(), spec.clone());
    }

    fn remove_marker(&mut self, id: &str) {
        let mut state = self.state.lock();
        state.removes += 1;
        // Redundant removes are tolerated per the surface contract.
        state.markers.shift_remove(id);
    }

    fn set_pickup_routes(&mut self, segments: &[RouteSegment]) {
        let mut state = self.state.lock();
        state.route_replacements += 1;
        state.pickup_routes = segments.to_vec();
    }

    fn set_destination_routes(&mut self, segments: &[RouteSegment]) {
        let mut state = self.state.lock();
        state.route_replacements += 1;
        state.destination_routes = segments.to_vec();
    }

    fn clear(&mut self) {
        let mut state = self.state.lock();
        state.clears += 1;
        state.markers.clear();
        state.pickup_routes.clear();
        state.destination_routes.clear();
    }
}
