//! Session countdown.

use bevy_ecs::prelude::*;
use canteen_events::EventDetail;
use tracing::info;

use super::SpawnSchedule;
use crate::components::{SessionTimer, SimClock};
use crate::events::EventLog;

/// System: counts the session down and stops further arrivals when it ends.
/// Customers already queued or inside carry on.
pub fn tick_session(
    clock: Res<SimClock>,
    mut timer: ResMut<SessionTimer>,
    mut schedule: ResMut<SpawnSchedule>,
    mut events: ResMut<EventLog>,
) {
    if timer.advance(clock.dt()) {
        schedule.clear();
        info!(elapsed = clock.elapsed(), "session ended");
        events.record_facility(clock.now(), EventDetail::SessionEnded);
    }
}
