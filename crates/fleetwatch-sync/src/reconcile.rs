//! ---
//! fw_section: "05-live-sync"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Snapshot diffing against the marker registry."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
use std::collections::HashSet;

use fleetwatch_model::{MapEntity, Snapshot};
use indexmap::IndexMap;

use crate::metrics::SyncMetrics;
use crate::surface::{MarkerId, MarkerKind, MarkerSpec, RenderSurface};

/// Registry of markers currently applied to the surface, keyed by marker id.
///
/// Invariant: after a reconciliation pass the keys are exactly the ids that
/// should be visible — no orphan handles, no missing handles.
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    markers: IndexMap<MarkerId, MarkerSpec>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.markers.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.markers.keys().map(String::as_str)
    }

    pub fn get(&self, id: &str) -> Option<&MarkerSpec> {
        self.markers.get(id)
    }

    /// Apply a plan: creates and updates first, removals last, so an id that
    /// moves between kinds within one tick never flickers through a
    /// remove-then-create.
    pub fn apply(&mut self, plan: &ReconcilePlan, surface: &mut dyn RenderSurface) {
        for spec in &plan.to_create {
            surface.add_marker(spec);
            self.markers.insert(spec.id.clone(), spec.clone());
        }
        for spec in &plan.to_update {
            surface.update_marker(spec);
            self.markers.insert(spec.id.clone(), spec.clone());
        }
        for id in &plan.to_remove {
            surface.remove_marker(id);
            self.markers.shift_remove(id);
        }
    }
}

/// Marker deltas for one reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct ReconcilePlan {
    pub to_create: Vec<MarkerSpec>,
    pub to_update: Vec<MarkerSpec>,
    pub to_remove: Vec<MarkerId>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_remove.is_empty()
    }
}

/// Derived id for a customer's destination marker.
pub fn destination_marker_id(customer_id: &str) -> MarkerId {
    format!("{customer_id}-dest")
}

/// Markers that should be visible for this snapshot.
///
/// Dropped-off customers contribute nothing, so their primary and destination
/// markers fall out of the registry on the next pass. A destination marker
/// exists only while its parent still has a destination, independent of
/// whether the parent id itself is still present.
pub fn desired_markers(snapshot: &Snapshot) -> Vec<MarkerSpec> {
    let mut desired = Vec::with_capacity(snapshot.entity_count());
    for entity in snapshot.entities() {
        match entity {
            MapEntity::Vehicle(vehicle) => desired.push(MarkerSpec {
                id: vehicle.id.clone(),
                kind: MarkerKind::Vehicle {
                    state: vehicle.enroute,
                },
                position: vehicle.position(),
            }),
            MapEntity::Customer(customer) => {
                if customer.dropped_off {
                    continue;
                }
                desired.push(MarkerSpec {
                    id: customer.id.clone(),
                    kind: MarkerKind::Customer,
                    position: customer.pickup_position(),
                });
                if let Some(destination) = customer.destination() {
                    desired.push(MarkerSpec {
                        id: destination_marker_id(&customer.id),
                        kind: MarkerKind::Destination,
                        position: destination,
                    });
                }
            }
        }
    }
    desired
}

/// Diff the desired marker set against the registry.
pub fn diff(registry: &MarkerRegistry, desired: &[MarkerSpec]) -> ReconcilePlan {
    let desired_ids: HashSet<&str> = desired.iter().map(|spec| spec.id.as_str()).collect();

    let mut plan = ReconcilePlan::default();
    for spec in desired {
        if registry.contains(&spec.id) {
            plan.to_update.push(spec.clone());
        } else {
            plan.to_create.push(spec.clone());
        }
    }
    for id in registry.ids() {
        if !desired_ids.contains(id) {
            plan.to_remove.push(id.to_owned());
        }
    }
    plan
}

/// One full pass: derive the desired set, diff, apply, record.
pub fn reconcile(
    registry: &mut MarkerRegistry,
    snapshot: &Snapshot,
    surface: &mut dyn RenderSurface,
    metrics: Option<&SyncMetrics>,
) -> ReconcilePlan {
    let desired = desired_markers(snapshot);
    let plan = diff(registry, &desired);
    registry.apply(&plan, surface);
    if let Some(metrics) = metrics {
        metrics.record_pass(&plan);
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;
    use fleetwatch_model::Snapshot;
    use serde_json::json;

    fn snapshot(value: serde_json::Value) -> Snapshot {
        serde_json::from_value(value).unwrap()
    }

    fn baseline() -> Snapshot {
        snapshot(json!({
            "status": "success",
            "scenario_id": "s-1",
            "vehicles": [
                {"id": "v-1", "longitude": 11.58, "latitude": 48.13, "enroute": "idle"}
            ],
            "customers": [
                {
                    "id": "c-1", "fake_name": "Ada L.",
                    "longitude": 11.60, "latitude": 48.14,
                    "destination_longitude": 11.62, "destination_latitude": 48.16,
                    "awaiting_service": true, "picked_up": false
                }
            ]
        }))
    }

    #[test]
    fn registry_keys_match_snapshot_ids_after_a_pass() {
        let mut registry = MarkerRegistry::new();
        let mut surface = RecordingSurface::new();
        reconcile(&mut registry, &baseline(), &mut surface, None);

        let mut ids: Vec<&str> = registry.ids().collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["c-1", "c-1-dest", "v-1"]);
        assert_eq!(surface.marker_ids().len(), 3);
    }

    #[test]
    fn second_pass_over_same_snapshot_is_all_updates() {
        let mut registry = MarkerRegistry::new();
        let mut surface = RecordingSurface::new();
        let snap = baseline();
        reconcile(&mut registry, &snap, &mut surface, None);
        let plan = reconcile(&mut registry, &snap, &mut surface, None);

        assert!(plan.to_create.is_empty());
        assert!(plan.to_remove.is_empty());
        assert_eq!(plan.to_update.len(), 3);
    }

    #[test]
    fn vanished_entities_are_removed_after_updates() {
        let mut registry = MarkerRegistry::new();
        let mut surface = RecordingSurface::new();
        reconcile(&mut registry, &baseline(), &mut surface, None);

        let next = snapshot(json!({
            "status": "success",
            "scenario_id": "s-1",
            "vehicles": [
                {"id": "v-1", "longitude": 11.59, "latitude": 48.14, "enroute": "cust"}
            ],
            "customers": []
        }));
        let plan = reconcile(&mut registry, &next, &mut surface, None);

        assert_eq!(plan.to_update.len(), 1);
        let mut removed = plan.to_remove.clone();
        removed.sort_unstable();
        assert_eq!(removed, vec!["c-1", "c-1-dest"]);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("v-1"));
    }

    #[test]
    fn dropped_off_customer_loses_both_markers() {
        let mut registry = MarkerRegistry::new();
        let mut surface = RecordingSurface::new();
        reconcile(&mut registry, &baseline(), &mut surface, None);

        let next = snapshot(json!({
            "status": "success",
            "scenario_id": "s-1",
            "vehicles": [
                {"id": "v-1", "longitude": 11.62, "latitude": 48.16, "enroute": "idle"}
            ],
            "customers": [
                {
                    "id": "c-1", "fake_name": "Ada L.",
                    "longitude": 11.60, "latitude": 48.14,
                    "destination_longitude": 11.62, "destination_latitude": 48.16,
                    "picked_up": true, "dropped_off": true
                }
            ]
        }));
        reconcile(&mut registry, &next, &mut surface, None);

        assert!(!registry.contains("c-1"));
        assert!(!registry.contains("c-1-dest"));
        assert!(registry.contains("v-1"));
    }

    #[test]
    fn destination_marker_tracks_parent_destination() {
        let mut registry = MarkerRegistry::new();
        let mut surface = RecordingSurface::new();
        reconcile(&mut registry, &baseline(), &mut surface, None);
        assert!(registry.contains("c-1-dest"));

        // Parent keeps its primary marker but the destination disappears.
        let next = snapshot(json!({
            "status": "success",
            "scenario_id": "s-1",
            "vehicles": [],
            "customers": [
                {"id": "c-1", "fake_name": "Ada L.", "longitude": 11.60, "latitude": 48.14}
            ]
        }));
        reconcile(&mut registry, &next, &mut surface, None);
        assert!(registry.contains("c-1"));
        assert!(!registry.contains("c-1-dest"));
    }

    #[test]
    fn update_carries_new_position_and_kind() {
        let mut registry = MarkerRegistry::new();
        let mut surface = RecordingSurface::new();
        reconcile(&mut registry, &baseline(), &mut surface, None);

        let moved = snapshot(json!({
            "status": "success",
            "scenario_id": "s-1",
            "vehicles": [
                {"id": "v-1", "longitude": 11.59, "latitude": 48.14, "enroute": "cust"}
            ],
            "customers": []
        }));
        reconcile(&mut registry, &moved, &mut surface, None);

        let spec = registry.get("v-1").unwrap();
        assert_eq!(spec.position.longitude, 11.59);
        assert_eq!(
            spec.kind,
            MarkerKind::Vehicle {
                state: fleetwatch_model::MovementState::ToCustomer
            }
        );
    }
}
