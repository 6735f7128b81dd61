//! Snapshot Generation
//!
//! Point-in-time pictures of desks and customers.

use bevy_ecs::prelude::*;
use canteen_events::{generate_snapshot_id, FacilitySnapshot};
use std::fs;
use std::path::Path;

use crate::components::{Customer, DeskPool, FacilityController, FacilityTuning, SimClock};
use crate::systems::ArrivalQueue;
use crate::world::{FacilityWorld, WorldPort};

/// Resource: numbers snapshots in the order they are taken.
#[derive(Resource, Debug)]
pub struct SnapshotGenerator {
    next_snapshot_id: u64,
}

impl Default for SnapshotGenerator {
    fn default() -> Self {
        Self { next_snapshot_id: 1 }
    }
}

impl SnapshotGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        let id = generate_snapshot_id(self.next_snapshot_id);
        self.next_snapshot_id += 1;
        id
    }

    pub fn snapshot_count(&self) -> u64 {
        self.next_snapshot_id - 1
    }
}

/// Generate a complete facility snapshot. Customers are listed by id.
pub fn generate_snapshot<W: FacilityWorld>(world: &mut World) -> FacilitySnapshot {
    let snapshot_id = world.resource_mut::<SnapshotGenerator>().next_id();

    let mut query = world.query::<&Customer>();
    let level_height = world.resource::<FacilityTuning>().layout.level_height;
    let port = world.resource::<WorldPort<W>>();
    let mut customers: Vec<_> = query
        .iter(world)
        .filter(|customer| !customer.has_departed())
        .map(|customer| customer.snapshot(port.0.body(customer.id()), level_height))
        .collect();
    customers.sort_by_key(|c| c.customer_id);

    let controller = world.resource::<FacilityController>();
    FacilitySnapshot {
        snapshot_id,
        timestamp: world.resource::<SimClock>().now(),
        paused: controller.is_paused(),
        outcomes: controller.outcomes(),
        queue_length: world.resource::<ArrivalQueue>().len(),
        desks: world.resource::<DeskPool>().snapshot(),
        customers,
    }
}

/// Write snapshot to file
pub fn write_snapshot(snapshot: &FacilitySnapshot, path: impl AsRef<Path>) -> std::io::Result<()> {
    let json = snapshot.to_json()?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use canteen_events::fixtures;

    #[test]
    fn test_snapshot_ids_count_up() {
        let mut generator = SnapshotGenerator::new();
        assert_eq!(generator.next_id(), "snap_000001");
        assert_eq!(generator.next_id(), "snap_000002");
        assert_eq!(generator.snapshot_count(), 2);
    }

    #[test]
    fn test_write_snapshot() {
        let snapshot = fixtures::sample_snapshot();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        write_snapshot(&snapshot, &path).unwrap();

        let parsed: FacilitySnapshot =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.snapshot_id, snapshot.snapshot_id);
        assert_eq!(parsed.desks.len(), snapshot.desks.len());
    }
}
