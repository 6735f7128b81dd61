//! Snapshot Types
//!
//! Serialization structs for facility snapshots and state output.
//!
//! Snapshots capture desks, customers and outcome counters at a point in
//! time, used for analysis and debugging.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CustomerId, DeskId, SimTimestamp};

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// Reservation status of a desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeskStatus {
    #[default]
    Empty,
    /// Soft hold while the holder walks to the desk
    Reserved,
    Occupied,
}

impl fmt::Display for DeskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeskStatus::Empty => write!(f, "empty"),
            DeskStatus::Reserved => write!(f, "reserved"),
            DeskStatus::Occupied => write!(f, "occupied"),
        }
    }
}

/// Lifecycle state of a customer, without its per-state data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStateKind {
    FindDesk,
    MoveToDesk,
    Order,
    WaitForFood,
    Eating,
    Leave,
}

impl CustomerStateKind {
    /// Returns all state variants in lifecycle order.
    pub fn all() -> &'static [CustomerStateKind] {
        &[
            CustomerStateKind::FindDesk,
            CustomerStateKind::MoveToDesk,
            CustomerStateKind::Order,
            CustomerStateKind::WaitForFood,
            CustomerStateKind::Eating,
            CustomerStateKind::Leave,
        ]
    }

    /// True for the states in which the customer sits at its desk.
    pub fn is_seated(&self) -> bool {
        matches!(
            self,
            CustomerStateKind::Order | CustomerStateKind::WaitForFood | CustomerStateKind::Eating
        )
    }
}

impl fmt::Display for CustomerStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CustomerStateKind::FindDesk => "find_desk",
            CustomerStateKind::MoveToDesk => "move_to_desk",
            CustomerStateKind::Order => "order",
            CustomerStateKind::WaitForFood => "wait_for_food",
            CustomerStateKind::Eating => "eating",
            CustomerStateKind::Leave => "leave",
        };
        write!(f, "{}", name)
    }
}

/// Success and failure totals reported to the facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutcomeCounters {
    pub successes: u32,
    pub failures: u32,
}

impl OutcomeCounters {
    pub fn total(&self) -> u32 {
        self.successes + self.failures
    }
}

/// Desk snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskSnapshot {
    pub desk_id: DeskId,
    pub level: i32,
    pub x: f32,
    pub y: f32,
    pub status: DeskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<CustomerId>,
}

/// Customer snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub customer_id: CustomerId,
    pub state: CustomerStateKind,
    pub level: i32,
    pub x: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desk: Option<DeskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(default)]
    pub completed_orders: u32,
}

/// Complete facility snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilitySnapshot {
    pub snapshot_id: String,
    pub timestamp: SimTimestamp,
    pub paused: bool,
    pub outcomes: OutcomeCounters,
    pub queue_length: usize,
    pub desks: Vec<DeskSnapshot>,
    pub customers: Vec<CustomerSnapshot>,
}

impl FacilitySnapshot {
    /// Number of desks with the given status.
    pub fn desks_with_status(&self, status: DeskStatus) -> usize {
        self.desks.iter().filter(|d| d.status == status).count()
    }

    /// Looks up a customer by id.
    pub fn customer(&self, customer_id: CustomerId) -> Option<&CustomerSnapshot> {
        self.customers.iter().find(|c| c.customer_id == customer_id)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
