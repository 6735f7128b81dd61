//! Shared event types and serialization for the canteen simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! The engine emits these records and any downstream tooling reads them.

pub mod event;
pub mod ids;
pub mod snapshot;
pub mod timestamp;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

pub use ids::{CustomerId, DeskId};

pub use timestamp::SimTimestamp;

pub use event::*;

pub use snapshot::{
    generate_snapshot_id, CustomerSnapshot, CustomerStateKind, DeskSnapshot, DeskStatus,
    FacilitySnapshot, OutcomeCounters,
};
