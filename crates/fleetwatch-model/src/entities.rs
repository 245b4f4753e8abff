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

fn default_true() -> bool {
    true
}

fn default_speed() -> f64 {
    1.0
}

/// Geographic coordinate pair, longitude first (matching the wire order).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub longitude: f64,
    pub latitude: f64,
}

impl Position {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.longitude, self.latitude)
    }
}

/// Lifecycle stage of a vehicle: `Idle -> ToCustomer` on assignment,
/// `-> ToDestination` on pickup, `-> Idle` on drop-off, repeating for the
/// vehicle's lifetime. Driven by the backend engine; rendered here only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MovementState {
    #[default]
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "cust")]
    ToCustomer,
    #[serde(rename = "dest")]
    ToDestination,
}

impl MovementState {
    /// Static label used in metrics and status payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementState::Idle => "idle",
            MovementState::ToCustomer => "to_customer",
            MovementState::ToDestination => "to_destination",
        }
    }

    /// Operator-facing description.
    pub fn label(&self) -> &'static str {
        match self {
            MovementState::Idle => "Idle",
            MovementState::ToCustomer => "En route to customer",
            MovementState::ToDestination => "En route to destination",
        }
    }
}

impl fmt::Display for MovementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One vehicle as reported by the snapshot endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    #[serde(default)]
    pub scenario_id: String,
    #[serde(default)]
    pub vehicle_name: String,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub current_customer_id: Option<String>,
    #[serde(default)]
    pub active_time: f64,
    #[serde(default)]
    pub distance_travelled: f64,
    #[serde(default)]
    pub number_of_trips: u32,
    #[serde(default)]
    pub remaining_travel_time: f64,
    #[serde(default = "default_speed")]
    pub vehicle_speed: f64,
    /// Movement state; wire values are `idle`, `cust` and `dest`.
    #[serde(default)]
    pub enroute: MovementState,
}

impl Vehicle {
    pub fn position(&self) -> Position {
        Position::new(self.longitude, self.latitude)
    }

    /// Id of the customer this vehicle is currently serving, if any.
    pub fn assigned_customer(&self) -> Option<&str> {
        self.current_customer_id.as_deref()
    }
}

/// One customer as reported by the snapshot endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub scenario_id: String,
    /// Operator-facing name; the backend field is `fake_name`.
    #[serde(rename = "fake_name", default)]
    pub display_name: String,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub destination_longitude: Option<f64>,
    #[serde(default)]
    pub destination_latitude: Option<f64>,
    #[serde(default)]
    pub awaiting_service: bool,
    #[serde(default)]
    pub picked_up: bool,
    /// Older backends omit this field entirely.
    #[serde(default)]
    pub dropped_off: bool,
}

impl Customer {
    pub fn pickup_position(&self) -> Position {
        Position::new(self.longitude, self.latitude)
    }

    /// Destination, when both coordinates are present.
    pub fn destination(&self) -> Option<Position> {
        match (self.destination_longitude, self.destination_latitude) {
            (Some(longitude), Some(latitude)) => Some(Position::new(longitude, latitude)),
            _ => None,
        }
    }
}

/// Borrowed, explicitly tagged view over a snapshot record.
///
/// Reconciliation and route projection branch on this tag instead of
/// sniffing field shapes.
#[derive(Debug, Clone, Copy)]
pub enum MapEntity<'a> {
    Vehicle(&'a Vehicle),
    Customer(&'a Customer),
}

impl<'a> MapEntity<'a> {
    pub fn id(&self) -> &'a str {
        match *self {
            MapEntity::Vehicle(vehicle) => &vehicle.id,
            MapEntity::Customer(customer) => &customer.id,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            MapEntity::Vehicle(vehicle) => vehicle.position(),
            MapEntity::Customer(customer) => customer.pickup_position(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn movement_state_uses_wire_names() {
        assert_eq!(
            serde_json::to_value(MovementState::ToCustomer).unwrap(),
            json!("cust")
        );
        assert_eq!(
            serde_json::from_value::<MovementState>(json!("dest")).unwrap(),
            MovementState::ToDestination
        );
    }

    #[test]
    fn vehicle_decodes_backend_payload() {
        let vehicle: Vehicle = serde_json::from_value(json!({
            "id": "v-1",
            "scenario_id": "s-1",
            "vehicle_name": "Van 7",
            "longitude": 11.5820,
            "latitude": 48.1351,
            "is_available": false,
            "current_customer_id": "c-9",
            "active_time": 12.5,
            "distance_travelled": 3.2,
            "number_of_trips": 4,
            "remaining_travel_time": 0.8,
            "vehicle_speed": 1.4,
            "enroute": "cust"
        }))
        .unwrap();
        assert_eq!(vehicle.enroute, MovementState::ToCustomer);
        assert_eq!(vehicle.assigned_customer(), Some("c-9"));
        assert_eq!(vehicle.position(), Position::new(11.5820, 48.1351));
    }

    #[test]
    fn customer_destination_requires_both_coordinates() {
        let customer: Customer = serde_json::from_value(json!({
            "id": "c-1",
            "fake_name": "Ada L.",
            "longitude": 11.60,
            "latitude": 48.14,
            "destination_longitude": 11.61,
            "awaiting_service": true,
            "picked_up": false
        }))
        .unwrap();
        assert_eq!(customer.display_name, "Ada L.");
        assert_eq!(customer.destination(), None);
        assert!(!customer.dropped_off);
    }
}
