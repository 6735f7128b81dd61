//! Event Recording
//!
//! Systems record events into the [`EventLog`] resource. The log numbers them,
//! keeps running totals per category and holds them until the host drains
//! them or an [`EventLogger`] persists them.

pub mod logger;

pub use logger::{persist_events, EventLogger};

use bevy_ecs::prelude::*;
use canteen_events::{generate_event_id, CustomerId, Event, EventDetail, EventType, SimTimestamp};
use std::collections::HashMap;

/// Resource: events recorded since the last drain.
#[derive(Resource, Debug)]
pub struct EventLog {
    pending: Vec<Event>,
    next_sequence: u64,
    counts: HashMap<EventType, u64>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            next_sequence: 1,
            counts: HashMap::new(),
        }
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_customer(&mut self, now: SimTimestamp, customer: CustomerId, detail: EventDetail) {
        let id = self.next_id();
        self.push(Event::for_customer(id, now, customer, detail));
    }

    pub fn record_facility(&mut self, now: SimTimestamp, detail: EventDetail) {
        let id = self.next_id();
        self.push(Event::facility(id, now, detail));
    }

    fn next_id(&mut self) -> String {
        let id = generate_event_id(self.next_sequence);
        self.next_sequence += 1;
        id
    }

    fn push(&mut self, event: Event) {
        *self.counts.entry(event.event_type()).or_insert(0) += 1;
        self.pending.push(event);
    }

    pub fn pending(&self) -> &[Event] {
        &self.pending
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.pending)
    }

    /// Events recorded over the whole run, drained or not.
    pub fn total(&self) -> u64 {
        self.next_sequence - 1
    }

    pub fn count(&self, event_type: EventType) -> u64 {
        self.counts.get(&event_type).copied().unwrap_or(0)
    }
}
