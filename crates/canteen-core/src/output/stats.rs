//! Statistics Output
//!
//! Summary counters for a run, written as JSON at the end.

use bevy_ecs::prelude::*;
use canteen_events::{EventType, OutcomeCounters};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::components::{Customer, DeskPool, FacilityController, SimClock, StatusCounts};
use crate::events::EventLog;
use crate::systems::ArrivalQueue;

/// Overall facility statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityStats {
    pub ticks: u64,
    pub elapsed_seconds: f64,
    pub outcomes: OutcomeCounters,
    /// Share of reported visits that succeeded, if any were reported
    pub success_rate: Option<f64>,
    pub desks: StatusCounts,
    pub customers_by_state: BTreeMap<String, usize>,
    pub queue_length: usize,
    pub total_events: u64,
    pub events_by_type: BTreeMap<String, u64>,
}

impl FacilityStats {
    pub fn customers_inside(&self) -> usize {
        self.customers_by_state.values().sum()
    }
}

/// Collects statistics from the current facility state.
pub fn collect_stats(world: &mut World) -> FacilityStats {
    let mut customers_by_state = BTreeMap::new();
    let mut query = world.query::<&Customer>();
    for customer in query.iter(world) {
        if customer.has_departed() {
            continue;
        }
        *customers_by_state.entry(customer.kind().to_string()).or_insert(0) += 1;
    }

    let log = world.resource::<EventLog>();
    let events_by_type = EventType::all()
        .iter()
        .map(|t| (format!("{:?}", t).to_lowercase(), log.count(*t)))
        .filter(|(_, count)| *count > 0)
        .collect();

    let clock = world.resource::<SimClock>();
    let outcomes = world.resource::<FacilityController>().outcomes();
    let success_rate = if outcomes.total() > 0 {
        Some(outcomes.successes as f64 / outcomes.total() as f64)
    } else {
        None
    };

    FacilityStats {
        ticks: clock.tick(),
        elapsed_seconds: clock.elapsed(),
        outcomes,
        success_rate,
        desks: world.resource::<DeskPool>().status_counts(),
        customers_by_state,
        queue_length: world.resource::<ArrivalQueue>().len(),
        total_events: log.total(),
        events_by_type,
    }
}

/// Write statistics to output file
pub fn write_stats(stats: &FacilityStats, path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }

    let json = serde_json::to_string_pretty(stats)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use canteen_events::{CustomerId, DeskId, EventDetail, SimTimestamp};

    fn world_with_resources() -> World {
        let mut world = World::new();
        let mut pool = DeskPool::new(3.0);
        pool.add_desk(DeskId(0), 1.0, 0.0);
        pool.add_desk(DeskId(1), 2.0, 0.0);
        pool.reserve(DeskId(1), CustomerId(1)).unwrap();
        world.insert_resource(pool);
        world.insert_resource(SimClock::new());
        world.insert_resource(FacilityController::new());
        world.insert_resource(ArrivalQueue::new(4, 1.0));
        world.insert_resource(EventLog::new());
        world
    }

    #[test]
    fn test_collect_stats() {
        let mut world = world_with_resources();
        world.resource_mut::<FacilityController>().report_success(CustomerId(1));
        world.resource_mut::<FacilityController>().report_failure(CustomerId(2));
        world.resource_mut::<FacilityController>().report_success(CustomerId(3));
        world.resource_mut::<EventLog>().record_facility(SimTimestamp::start(), EventDetail::Paused);

        let stats = collect_stats(&mut world);
        assert_eq!(stats.outcomes.total(), 3);
        assert!((stats.success_rate.unwrap() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.desks.empty, 1);
        assert_eq!(stats.desks.reserved, 1);
        assert_eq!(stats.customers_inside(), 0);
        assert_eq!(stats.total_events, 1);
        assert_eq!(stats.events_by_type.get("facility"), Some(&1));
    }

    #[test]
    fn test_no_reports_means_no_rate() {
        let mut world = world_with_resources();
        assert_eq!(collect_stats(&mut world).success_rate, None);
    }

    #[test]
    fn test_write_stats_creates_directory() {
        let mut world = world_with_resources();
        let stats = collect_stats(&mut world);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("stats.json");
        write_stats(&stats, &path).unwrap();
        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"queue_length\": 0"));
    }
}
