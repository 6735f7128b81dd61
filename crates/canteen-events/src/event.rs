//! Event Types
//!
//! Every lifecycle transition the engine considers worth recording is an
//! [`Event`]. Events are written one per line (JSONL) by the engine's logger.

use serde::{Deserialize, Serialize};

use crate::{CustomerId, CustomerStateKind, DeskId, SimTimestamp};

/// Primary event type categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Arrival,
    Lifecycle,
    Desk,
    Navigation,
    Order,
    Outcome,
    Facility,
}

impl EventType {
    /// Returns all event type variants.
    pub fn all() -> &'static [EventType] {
        &[
            EventType::Arrival,
            EventType::Lifecycle,
            EventType::Desk,
            EventType::Navigation,
            EventType::Order,
            EventType::Outcome,
            EventType::Facility,
        ]
    }
}

/// Why a customer gave up the desk it was heading for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbandonReason {
    /// No staircase registered for a level boundary on the route
    NoTransferPoint,
    /// Movement stalled more times than allowed
    Stuck,
    /// The desk was removed or released from under the customer
    DeskLost,
}

/// Why a customer's visit ended in failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Food did not arrive within the allowed wait
    FoodTimeout,
    /// No desk freed up within the allowed wait
    DeskTimeout,
    /// The order catalog had nothing to offer
    NoOrderAvailable,
    /// The desk vanished while the customer was seated
    DeskLost,
    /// The customer was taken out of the simulation by the host
    Removed,
}

/// Event payload, tagged by `type` in serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventDetail {
    ArrivalQueued { queue_length: usize },
    ArrivalRejected { queue_length: usize },
    CustomerAdmitted { x: f32 },
    StateChanged { from: CustomerStateKind, to: CustomerStateKind },
    DeskReserved { desk_id: DeskId, level: i32 },
    DeskAbandoned { desk_id: DeskId, reason: AbandonReason },
    Seated { desk_id: DeskId },
    NavigationStuck { target_x: f32 },
    NoTransferPoint { boundary: i32 },
    /// `dish` is absent when the catalog could not produce an order
    OrderPlaced {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dish: Option<String>,
    },
    FoodServed { dish: String },
    MealFinished { completed_orders: u32 },
    CustomerSucceeded,
    CustomerFailed { reason: FailureReason },
    CustomerLeft,
    CustomerRemoved,
    SessionEnded,
    Paused,
    Resumed,
    Reset,
}

impl EventDetail {
    /// Category this detail belongs to.
    pub fn event_type(&self) -> EventType {
        match self {
            EventDetail::ArrivalQueued { .. }
            | EventDetail::ArrivalRejected { .. }
            | EventDetail::CustomerAdmitted { .. } => EventType::Arrival,
            EventDetail::StateChanged { .. }
            | EventDetail::CustomerLeft
            | EventDetail::CustomerRemoved => EventType::Lifecycle,
            EventDetail::DeskReserved { .. }
            | EventDetail::DeskAbandoned { .. }
            | EventDetail::Seated { .. } => EventType::Desk,
            EventDetail::NavigationStuck { .. } | EventDetail::NoTransferPoint { .. } => {
                EventType::Navigation
            }
            EventDetail::OrderPlaced { .. }
            | EventDetail::FoodServed { .. }
            | EventDetail::MealFinished { .. } => EventType::Order,
            EventDetail::CustomerSucceeded | EventDetail::CustomerFailed { .. } => {
                EventType::Outcome
            }
            EventDetail::SessionEnded
            | EventDetail::Paused
            | EventDetail::Resumed
            | EventDetail::Reset => EventType::Facility,
        }
    }
}

/// A single recorded simulation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub timestamp: SimTimestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    pub detail: EventDetail,
}

impl Event {
    /// Create a new event about a specific customer.
    pub fn for_customer(
        event_id: impl Into<String>,
        timestamp: SimTimestamp,
        customer_id: CustomerId,
        detail: EventDetail,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            timestamp,
            customer_id: Some(customer_id),
            detail,
        }
    }

    /// Create a new facility-wide event.
    pub fn facility(event_id: impl Into<String>, timestamp: SimTimestamp, detail: EventDetail) -> Self {
        Self {
            event_id: event_id.into(),
            timestamp,
            customer_id: None,
            detail,
        }
    }

    pub fn event_type(&self) -> EventType {
        self.detail.event_type()
    }

    /// Checks if a specific customer is the subject of this event.
    pub fn involves_customer(&self, customer_id: CustomerId) -> bool {
        self.customer_id == Some(customer_id)
    }

    /// Serializes the event to a JSON line (for JSONL format).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an event from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Generates an event ID with the given sequence number.
pub fn generate_event_id(sequence: u64) -> String {
    format!("evt_{:08}", sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_serialization() {
        assert_eq!(serde_json::to_string(&EventType::Arrival).unwrap(), r#""arrival""#);
        assert_eq!(serde_json::to_string(&EventType::Navigation).unwrap(), r#""navigation""#);
        assert_eq!(EventType::all().len(), 7);
    }

    #[test]
    fn test_detail_is_tagged() {
        let detail = EventDetail::DeskReserved { desk_id: DeskId(3), level: 1 };
        let json = serde_json::to_string(&detail).unwrap();
        assert_eq!(json, r#"{"type":"desk_reserved","desk_id":3,"level":1}"#);

        let unit = serde_json::to_string(&EventDetail::CustomerLeft).unwrap();
        assert_eq!(unit, r#"{"type":"customer_left"}"#);
    }

    #[test]
    fn test_missing_dish_is_omitted() {
        let json = serde_json::to_string(&EventDetail::OrderPlaced { dish: None }).unwrap();
        assert_eq!(json, r#"{"type":"order_placed"}"#);
        let parsed: EventDetail = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, EventDetail::OrderPlaced { dish: None });
    }

    #[test]
    fn test_event_categories() {
        assert_eq!(
            EventDetail::CustomerFailed { reason: FailureReason::FoodTimeout }.event_type(),
            EventType::Outcome
        );
        assert_eq!(EventDetail::NoTransferPoint { boundary: 1 }.event_type(), EventType::Navigation);
        assert_eq!(EventDetail::Paused.event_type(), EventType::Facility);
        assert_eq!(
            EventDetail::StateChanged {
                from: CustomerStateKind::FindDesk,
                to: CustomerStateKind::MoveToDesk
            }
            .event_type(),
            EventType::Lifecycle
        );
    }

    #[test]
    fn test_event_jsonl() {
        let event = Event::for_customer(
            generate_event_id(1),
            SimTimestamp::new(30, 0.5),
            CustomerId(2),
            EventDetail::FoodServed { dish: "ramen".to_string() },
        );
        let line = event.to_jsonl().unwrap();
        assert!(!line.contains('\n'));
        assert_eq!(Event::from_jsonl(&line).unwrap(), event);
        assert!(event.involves_customer(CustomerId(2)));
        assert!(!event.involves_customer(CustomerId(3)));
    }

    #[test]
    fn test_facility_event_has_no_customer() {
        let event = Event::facility("evt_00000009", SimTimestamp::start(), EventDetail::Reset);
        let json = event.to_jsonl().unwrap();
        assert!(!json.contains("customer_id"));
        assert_eq!(event.event_type(), EventType::Facility);
    }
}
