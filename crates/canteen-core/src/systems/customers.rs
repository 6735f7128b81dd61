//! Customer Systems
//!
//! Drives every customer's state machine once per tick and clears away the
//! ones that have left.

use bevy_ecs::prelude::*;

use crate::components::{
    Customer, DeskPool, FacilityController, FacilityTuning, FaultLog, OrderCatalog, SimClock,
    StairRegistry,
};
use crate::events::EventLog;
use crate::states::StateContext;
use crate::world::{FacilityWorld, WorldPort};
use crate::SimRng;

/// System: runs one tick of each customer's lifecycle.
///
/// A customer whose body has vanished from the host is treated as removed:
/// its desk is freed and a failure is counted.
#[allow(clippy::too_many_arguments)]
pub fn run_customers<W: FacilityWorld>(
    clock: Res<SimClock>,
    tuning: Res<FacilityTuning>,
    stairs: Res<StairRegistry>,
    catalog: Res<OrderCatalog>,
    mut pool: ResMut<DeskPool>,
    mut port: ResMut<WorldPort<W>>,
    mut rng: ResMut<SimRng>,
    mut controller: ResMut<FacilityController>,
    mut faults: ResMut<FaultLog>,
    mut events: ResMut<EventLog>,
    mut customers: Query<&mut Customer>,
) {
    let now = clock.now();
    for mut customer in &mut customers {
        if customer.has_departed() {
            continue;
        }
        if port.0.body(customer.id()).is_none() {
            customer.remove(now, &mut pool, &mut controller, &mut events);
            continue;
        }

        let mut ctx = StateContext {
            now,
            dt: clock.dt(),
            tuning: &tuning,
            stairs: &stairs,
            catalog: &catalog,
            pool: &mut pool,
            world: &mut port.0,
            rng: &mut rng.0,
            controller: &mut controller,
            faults: &mut faults,
            events: &mut events,
        };
        customer.update(&mut ctx);
    }
}

/// System: despawns departed customers together with their bodies.
pub fn despawn_departed<W: FacilityWorld>(
    mut commands: Commands,
    mut port: ResMut<WorldPort<W>>,
    customers: Query<(Entity, &Customer)>,
) {
    for (entity, customer) in &customers {
        if customer.has_departed() {
            port.0.despawn_body(customer.id());
            commands.entity(entity).despawn();
        }
    }
}
