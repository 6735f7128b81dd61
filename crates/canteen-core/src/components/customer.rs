//! Customer Component
//!
//! A customer entity carries its visit record (who it is, what it holds,
//! what it ordered, how it ended) and its current lifecycle state.

use bevy_ecs::prelude::*;
use canteen_events::{CustomerId, CustomerSnapshot, CustomerStateKind, DeskId, FailureReason};

use super::catalog::Order;
use super::clock::LifecycleClock;
use crate::config::CustomerProfile;
use crate::states::CustomerState;
use crate::world::BodyState;

/// How a visit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(FailureReason),
}

/// Everything about a customer except its state machine.
#[derive(Debug, Clone)]
pub struct Visit {
    pub id: CustomerId,
    pub profile: CustomerProfile,
    /// Desk this customer believes it holds
    pub desk: Option<DeskId>,
    pub order: Option<Order>,
    pub completed_orders: u32,
    pub clock: LifecycleClock,
    pub outcome: Option<Outcome>,
    /// Desk given up on last, avoided while others are free
    pub shunned_desk: Option<DeskId>,
    /// Set once the customer has left and may be despawned
    pub departed: bool,
}

impl Visit {
    pub fn new(id: CustomerId, profile: CustomerProfile) -> Self {
        Self {
            id,
            profile,
            desk: None,
            order: None,
            completed_orders: 0,
            clock: LifecycleClock::default(),
            outcome: None,
            shunned_desk: None,
            departed: false,
        }
    }
}

/// Component: a customer inside the facility.
#[derive(Component, Debug, Clone)]
pub struct Customer {
    pub visit: Visit,
    pub state: CustomerState,
    pub(crate) started: bool,
}

impl Customer {
    pub fn new(id: CustomerId, profile: CustomerProfile) -> Self {
        Self {
            visit: Visit::new(id, profile),
            state: CustomerState::fresh(CustomerStateKind::FindDesk),
            started: false,
        }
    }

    pub fn id(&self) -> CustomerId {
        self.visit.id
    }

    pub fn kind(&self) -> CustomerStateKind {
        self.state.kind()
    }

    pub fn desk(&self) -> Option<DeskId> {
        self.visit.desk
    }

    pub fn order(&self) -> Option<&Order> {
        self.visit.order.as_ref()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.visit.outcome
    }

    pub fn completed_orders(&self) -> u32 {
        self.visit.completed_orders
    }

    pub fn waiting_for_food(&self) -> f32 {
        self.visit.clock.waiting_for_food()
    }

    pub fn waiting_for_desk(&self) -> f32 {
        self.visit.clock.waiting_for_desk()
    }

    pub fn has_departed(&self) -> bool {
        self.visit.departed
    }

    pub fn snapshot(&self, body: Option<BodyState>, level_height: f32) -> CustomerSnapshot {
        CustomerSnapshot {
            customer_id: self.visit.id,
            state: self.kind(),
            level: body.map_or(0, |b| b.level(level_height)),
            x: body.map_or(0.0, |b| b.x),
            desk: self.visit.desk,
            order: self
                .visit
                .order
                .as_ref()
                .and_then(|o| o.dish())
                .map(str::to_string),
            completed_orders: self.visit.completed_orders,
        }
    }
}
