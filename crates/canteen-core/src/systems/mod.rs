//! ECS Systems
//!
//! One facility tick runs, in order: the session countdown, arrivals,
//! every customer's state machine, cleanup of departed customers and event
//! persistence.

pub mod arrivals;
pub mod customers;
pub mod session;

pub use arrivals::{
    admit_arrivals, admit_customer, queue_arrival, schedule_arrivals, ArrivalQueue, SpawnSchedule,
};
pub use customers::{despawn_departed, run_customers};
pub use session::tick_session;

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;

use crate::events::persist_events;
use crate::world::FacilityWorld;

/// Builds the per-tick schedule for a facility hosted by `W`.
pub fn build_schedule<W: FacilityWorld>() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems(
        (
            tick_session,
            schedule_arrivals,
            admit_arrivals::<W>,
            run_customers::<W>,
            despawn_departed::<W>,
            persist_events,
        )
            .chain(),
    );
    schedule
}
