//! Sample data fixtures for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! ```ignore
//! // [dev-dependencies]
//! // canteen-events = { path = "../canteen-events", features = ["test-fixtures"] }
//!
//! use canteen_events::fixtures;
//!
//! let events = fixtures::sample_events();
//! let snapshot = fixtures::sample_snapshot();
//! ```

use crate::{Event, EventType, FacilitySnapshot};

/// Returns sample events from the fixtures file.
///
/// Contains 12 events: one customer's full successful visit, a food timeout,
/// a missing staircase and the end of the session.
pub fn sample_events() -> Vec<Event> {
    let jsonl = include_str!("../tests/fixtures/sample_events.jsonl");
    jsonl
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            Event::from_jsonl(l).unwrap_or_else(|e| {
                panic!("Failed to parse event line: {}\nError: {}", l, e)
            })
        })
        .collect()
}

/// Returns a sample facility snapshot from the fixtures file.
///
/// Three desks over two levels, one of each status, and three customers.
pub fn sample_snapshot() -> FacilitySnapshot {
    let json = include_str!("../tests/fixtures/sample_state.json");
    serde_json::from_str(json).expect("Failed to parse sample_state.json")
}

/// Returns a specific event by ID from the sample events.
pub fn get_event(event_id: &str) -> Option<Event> {
    sample_events().into_iter().find(|e| e.event_id == event_id)
}

/// Returns the sample events of one category.
pub fn events_of_type(event_type: EventType) -> Vec<Event> {
    sample_events()
        .into_iter()
        .filter(|e| e.event_type() == event_type)
        .collect()
}
