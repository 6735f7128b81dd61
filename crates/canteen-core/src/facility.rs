//! Facility
//!
//! The composition root. A [`Facility`] owns the ECS world with every
//! resource the simulation needs, the per-tick schedule, and the host world
//! `W` the customers' bodies live in. Hosts drive it with [`Facility::step`]
//! and talk to it through the methods here; everything else is internal.

use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemState;
use canteen_events::{CustomerId, Event, EventDetail, FacilitySnapshot, OutcomeCounters, SimTimestamp};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::marker::PhantomData;
use tracing::{debug, info};

use crate::components::{
    Customer, DeskPool, FacilityController, FacilityTuning, FaultLog, OrderCatalog, ResetPolicy,
    SessionTimer, SimClock, StairRegistry,
};
use crate::config::{CanteenConfig, ConfigError};
use crate::events::{EventLog, EventLogger};
use crate::output::{collect_stats, generate_snapshot, FacilityStats, SnapshotGenerator};
use crate::setup;
use crate::systems::{self, admit_customer, queue_arrival, ArrivalQueue, SpawnSchedule};
use crate::world::{FacilityWorld, WorldPort};
use crate::SimRng;

pub struct Facility<W: FacilityWorld> {
    world: World,
    schedule: Schedule,
    _host: PhantomData<W>,
}

impl<W: FacilityWorld> Facility<W> {
    /// Builds a facility from a configuration. The same configuration, host
    /// and seed always produce the same run.
    pub fn new(config: &CanteenConfig, port: W, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = SmallRng::seed_from_u64(seed);
        let pool = setup::build_desk_pool(config);
        let stairs = setup::build_stairs(config);
        let catalog =
            setup::build_catalog(config).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let spawns = SpawnSchedule::from_rules(&config.arrivals.rules, &mut rng);

        let summary = setup::layout_summary(&pool, &stairs, &catalog);
        info!(
            seed,
            desks = summary.desks,
            levels = summary.levels,
            staircases = summary.staircases,
            dishes = summary.dishes,
            arrivals = spawns.remaining(),
            "facility ready"
        );

        let mut world = World::new();
        world.insert_resource(FacilityTuning::from_config(config));
        world.insert_resource(pool);
        world.insert_resource(stairs);
        world.insert_resource(catalog);
        world.insert_resource(spawns);
        world.insert_resource(ArrivalQueue::from_config(&config.arrivals));
        world.insert_resource(SessionTimer::new(config.arrivals.session_length));
        world.insert_resource(SimClock::new());
        world.insert_resource(FacilityController::new());
        world.insert_resource(FaultLog::default());
        world.insert_resource(EventLog::new());
        world.insert_resource(SnapshotGenerator::new());
        world.insert_resource(SimRng(rng));
        world.insert_resource(WorldPort(port));

        Ok(Self {
            world,
            schedule: systems::build_schedule::<W>(),
            _host: PhantomData,
        })
    }

    /// Advances the facility by one tick of `dt` seconds. Does nothing and
    /// returns false while paused or for a non-positive `dt`.
    pub fn step(&mut self, dt: f32) -> bool {
        if self.is_paused() || !dt.is_finite() || dt <= 0.0 {
            return false;
        }
        self.world.resource_mut::<SimClock>().advance(dt);
        self.schedule.run(&mut self.world);
        true
    }

    pub fn pause(&mut self) {
        if self.world.resource_mut::<FacilityController>().pause() {
            info!("facility paused");
            self.record(EventDetail::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.world.resource_mut::<FacilityController>().resume() {
            info!("facility resumed");
            self.record(EventDetail::Resumed);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.world.resource::<FacilityController>().is_paused()
    }

    /// Zeroes the outcome counters, frees every desk and empties the queue.
    pub fn reset(&mut self, policy: ResetPolicy) {
        self.world.resource_mut::<FacilityController>().reset_counters();
        let released = self.world.resource_mut::<DeskPool>().release_all();
        self.world.resource_mut::<ArrivalQueue>().clear();

        let mut removed = 0;
        if policy == ResetPolicy::RemoveCustomers {
            let mut query = self.world.query::<(Entity, &Customer)>();
            let inside: Vec<(Entity, CustomerId)> = query
                .iter(&self.world)
                .map(|(entity, customer)| (entity, customer.id()))
                .collect();
            for (entity, id) in inside {
                self.world_port_mut().despawn_body(id);
                self.world.despawn(entity);
                removed += 1;
            }
        }

        info!(released, removed, ?policy, "facility reset");
        self.record(EventDetail::Reset);
    }

    /// Adds an arrival to the queue outside. None if the queue is full.
    pub fn spawn_customer(&mut self) -> Option<CustomerId> {
        let now = self.now();
        let mut state = SystemState::<(ResMut<ArrivalQueue>, ResMut<EventLog>)>::new(&mut self.world);
        let (mut queue, mut events) = state.get_mut(&mut self.world);
        queue_arrival(&mut queue, now, &mut events)
    }

    /// Lets a customer in at once, skipping the queue.
    pub fn admit_now(&mut self) -> CustomerId {
        let now = self.now();
        let mut state = SystemState::<(
            Res<FacilityTuning>,
            ResMut<ArrivalQueue>,
            ResMut<WorldPort<W>>,
            ResMut<EventLog>,
        )>::new(&mut self.world);
        let (tuning, mut queue, mut port, mut events) = state.get_mut(&mut self.world);
        let id = queue.issue_id();
        let customer = admit_customer(id, now, &tuning, &mut port.0, &mut events);
        self.world.spawn(customer);
        id
    }

    /// Takes a customer out of the simulation. Its desk is freed at once and
    /// a failure is counted unless the visit already had an outcome.
    /// Returns false for an unknown customer.
    pub fn remove_customer(&mut self, id: CustomerId) -> bool {
        let Some(entity) = self.find_entity(id) else {
            return false;
        };
        let Some(mut customer) = self.world.entity_mut(entity).take::<Customer>() else {
            return false;
        };

        let now = self.now();
        let mut state = SystemState::<(
            ResMut<DeskPool>,
            ResMut<FacilityController>,
            ResMut<EventLog>,
            ResMut<WorldPort<W>>,
        )>::new(&mut self.world);
        let (mut pool, mut controller, mut events, mut port) = state.get_mut(&mut self.world);
        customer.remove(now, &mut pool, &mut controller, &mut events);
        port.0.despawn_body(id);

        self.world.despawn(entity);
        debug!(customer = %id, "customer removed by host");
        true
    }

    fn find_entity(&self, id: CustomerId) -> Option<Entity> {
        self.world
            .iter_entities()
            .find(|entity| entity.get::<Customer>().map_or(false, |c| c.id() == id))
            .map(|entity| entity.id())
    }

    fn record(&mut self, detail: EventDetail) {
        let now = self.now();
        self.world.resource_mut::<EventLog>().record_facility(now, detail);
    }

    pub fn customer(&self, id: CustomerId) -> Option<&Customer> {
        self.world
            .iter_entities()
            .filter_map(|entity| entity.get::<Customer>())
            .find(|customer| customer.id() == id)
    }

    /// Every customer inside, by id.
    pub fn customers(&self) -> Vec<&Customer> {
        let mut customers: Vec<&Customer> = self
            .world
            .iter_entities()
            .filter_map(|entity| entity.get::<Customer>())
            .collect();
        customers.sort_by_key(|customer| customer.id());
        customers
    }

    pub fn world_port(&self) -> &W {
        &self.world.resource::<WorldPort<W>>().0
    }

    pub fn world_port_mut(&mut self) -> &mut W {
        &mut self.world.resource_mut::<WorldPort<W>>().into_inner().0
    }

    pub fn pool(&self) -> &DeskPool {
        self.world.resource::<DeskPool>()
    }

    /// Desks may be added, moved or removed between ticks.
    pub fn pool_mut(&mut self) -> &mut DeskPool {
        self.world.resource_mut::<DeskPool>().into_inner()
    }

    pub fn stairs(&self) -> &StairRegistry {
        self.world.resource::<StairRegistry>()
    }

    pub fn stairs_mut(&mut self) -> &mut StairRegistry {
        self.world.resource_mut::<StairRegistry>().into_inner()
    }

    pub fn catalog_mut(&mut self) -> &mut OrderCatalog {
        self.world.resource_mut::<OrderCatalog>().into_inner()
    }

    pub fn queue(&self) -> &ArrivalQueue {
        self.world.resource::<ArrivalQueue>()
    }

    pub fn session(&self) -> &SessionTimer {
        self.world.resource::<SessionTimer>()
    }

    pub fn outcomes(&self) -> OutcomeCounters {
        self.world.resource::<FacilityController>().outcomes()
    }

    pub fn now(&self) -> SimTimestamp {
        self.world.resource::<SimClock>().now()
    }

    /// Events not yet drained or persisted.
    pub fn events(&self) -> &[Event] {
        self.world.resource::<EventLog>().pending()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.world.resource_mut::<EventLog>().drain()
    }

    /// From the next tick on, events are written to `logger` instead of
    /// being held for [`Facility::drain_events`].
    pub fn install_logger(&mut self, logger: EventLogger) {
        self.world.insert_resource(logger);
    }

    /// Writes out anything recorded since the last tick and flushes the
    /// logger, if one is installed.
    pub fn flush_events(&mut self) -> std::io::Result<()> {
        if !self.world.contains_resource::<EventLogger>() {
            return Ok(());
        }
        let pending = self.world.resource_mut::<EventLog>().drain();
        let mut logger = self.world.resource_mut::<EventLogger>();
        logger.log_batch(&pending)?;
        logger.flush()
    }

    pub fn snapshot(&mut self) -> FacilitySnapshot {
        generate_snapshot::<W>(&mut self.world)
    }

    pub fn stats(&mut self) -> FacilityStats {
        collect_stats(&mut self.world)
    }
}
