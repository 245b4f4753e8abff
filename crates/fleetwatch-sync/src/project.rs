//! ---
//! fw_section: "05-live-sync"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Route projection from vehicle/customer pairing state."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
use std::collections::HashMap;

use fleetwatch_model::{Customer, MovementState, Position, Vehicle};

/// One active transit line on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegment {
    pub vehicle_id: String,
    pub customer_id: String,
    pub from: Position,
    pub to: Position,
}

/// Segments for the two line layers, recomputed wholesale every tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteSet {
    pub pickup: Vec<RouteSegment>,
    pub destination: Vec<RouteSegment>,
}

impl RouteSet {
    pub fn is_empty(&self) -> bool {
        self.pickup.is_empty() && self.destination.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pickup.len() + self.destination.len()
    }
}

/// Derive the active transit segments from the current pairing state.
///
/// A pickup segment (vehicle -> customer pickup) exists only while the
/// customer is not yet picked up and the vehicle is en route to them. A
/// destination segment (vehicle -> customer destination) exists only once the
/// customer is picked up, has a destination, and the vehicle is en route to
/// it. Every other combination yields nothing.
pub fn project(vehicles: &[Vehicle], customers: &[Customer]) -> RouteSet {
    let by_id: HashMap<&str, &Customer> = customers
        .iter()
        .map(|customer| (customer.id.as_str(), customer))
        .collect();

    let mut routes = RouteSet::default();
    for vehicle in vehicles {
        let Some(customer_id) = vehicle.assigned_customer() else {
            continue;
        };
        let Some(customer) = by_id.get(customer_id) else {
            continue;
        };
        match vehicle.enroute {
            MovementState::ToCustomer if !customer.picked_up => {
                routes.pickup.push(RouteSegment {
                    vehicle_id: vehicle.id.clone(),
                    customer_id: customer.id.clone(),
                    from: vehicle.position(),
                    to: customer.pickup_position(),
                });
            }
            MovementState::ToDestination if customer.picked_up => {
                if let Some(destination) = customer.destination() {
                    routes.destination.push(RouteSegment {
                        vehicle_id: vehicle.id.clone(),
                        customer_id: customer.id.clone(),
                        from: vehicle.position(),
                        to: destination,
                    });
                }
            }
            _ => {}
        }
    }
    routes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(id: &str, state: MovementState, customer: Option<&str>) -> Vehicle {
        Vehicle {
            id: id.to_owned(),
            scenario_id: "s-1".to_owned(),
            vehicle_name: String::new(),
            longitude: 11.60,
            latitude: 48.14,
            is_available: customer.is_none(),
            current_customer_id: customer.map(str::to_owned),
            active_time: 0.0,
            distance_travelled: 0.0,
            number_of_trips: 0,
            remaining_travel_time: 0.0,
            vehicle_speed: 1.0,
            enroute: state,
        }
    }

    fn customer(id: &str, picked_up: bool, destination: Option<(f64, f64)>) -> Customer {
        Customer {
            id: id.to_owned(),
            scenario_id: "s-1".to_owned(),
            display_name: String::new(),
            longitude: 11.61,
            latitude: 48.15,
            destination_longitude: destination.map(|(longitude, _)| longitude),
            destination_latitude: destination.map(|(_, latitude)| latitude),
            awaiting_service: !picked_up,
            picked_up,
            dropped_off: false,
        }
    }

    #[test]
    fn en_route_vehicle_yields_exactly_one_pickup_segment() {
        let vehicles = vec![vehicle("v-1", MovementState::ToCustomer, Some("c-1"))];
        let customers = vec![customer("c-1", false, Some((11.62, 48.16)))];
        let routes = project(&vehicles, &customers);
        assert_eq!(routes.pickup.len(), 1);
        assert!(routes.destination.is_empty());
        let segment = &routes.pickup[0];
        assert_eq!(segment.from, Position::new(11.60, 48.14));
        assert_eq!(segment.to, Position::new(11.61, 48.15));
    }

    #[test]
    fn picked_up_customer_yields_destination_segment_only() {
        let vehicles = vec![vehicle("v-1", MovementState::ToDestination, Some("c-1"))];
        let customers = vec![customer("c-1", true, Some((11.62, 48.16)))];
        let routes = project(&vehicles, &customers);
        assert!(routes.pickup.is_empty());
        assert_eq!(routes.destination.len(), 1);
        assert_eq!(routes.destination[0].to, Position::new(11.62, 48.16));
    }

    #[test]
    fn mismatched_state_and_pickup_flag_yields_nothing() {
        // Vehicle still marked en-route-to-customer but the customer is
        // already picked up, and vice versa.
        let vehicles = vec![
            vehicle("v-1", MovementState::ToCustomer, Some("c-1")),
            vehicle("v-2", MovementState::ToDestination, Some("c-2")),
        ];
        let customers = vec![
            customer("c-1", true, Some((11.62, 48.16))),
            customer("c-2", false, Some((11.63, 48.17))),
        ];
        assert!(project(&vehicles, &customers).is_empty());
    }

    #[test]
    fn idle_and_unassigned_vehicles_yield_nothing() {
        let vehicles = vec![
            vehicle("v-1", MovementState::Idle, Some("c-1")),
            vehicle("v-2", MovementState::ToCustomer, None),
        ];
        let customers = vec![customer("c-1", false, None)];
        assert!(project(&vehicles, &customers).is_empty());
    }

    #[test]
    fn destination_segment_requires_a_destination() {
        let vehicles = vec![vehicle("v-1", MovementState::ToDestination, Some("c-1"))];
        let customers = vec![customer("c-1", true, None)];
        assert!(project(&vehicles, &customers).is_empty());
    }

    #[test]
    fn dangling_assignment_is_skipped() {
        let vehicles = vec![vehicle("v-1", MovementState::ToCustomer, Some("c-gone"))];
        let routes = project(&vehicles, &[]);
        assert!(routes.is_empty());
    }
}
