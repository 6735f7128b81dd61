//! Arrivals
//!
//! Spawn rules expand into a list of arrival times. Each arrival joins a
//! bounded queue outside the door, and the head of the queue is let in at a
//! fixed interval whenever a desk is free.

use bevy_ecs::prelude::*;
use canteen_events::{CustomerId, EventDetail, SimTimestamp};
use rand::Rng;
use tracing::{debug, info};

use crate::components::{Customer, DeskPool, FacilityTuning, SimClock};
use crate::config::{ArrivalConfig, SpawnRule};
use crate::events::EventLog;
use crate::world::{FacilityWorld, WorldPort};

/// Resource: arrival times still to come, in seconds since the session start.
#[derive(Resource, Debug, Clone, Default)]
pub struct SpawnSchedule {
    /// Ascending
    times: Vec<f32>,
    next: usize,
}

impl SpawnSchedule {
    /// Expands `count` arrivals per rule, each jittered by up to `jitter`
    /// seconds either way and clamped at the session start.
    pub fn from_rules<R: Rng + ?Sized>(rules: &[SpawnRule], rng: &mut R) -> Self {
        let mut times = Vec::new();
        for rule in rules {
            for _ in 0..rule.count {
                let offset = if rule.jitter > 0.0 {
                    rng.gen_range(-rule.jitter..=rule.jitter)
                } else {
                    0.0
                };
                times.push((rule.time + offset).max(0.0));
            }
        }
        times.sort_by(f32::total_cmp);
        Self { times, next: 0 }
    }

    /// Number of arrivals whose time has come, consuming them.
    pub fn due(&mut self, elapsed: f64) -> usize {
        let start = self.next;
        while self.next < self.times.len() && self.times[self.next] as f64 <= elapsed {
            self.next += 1;
        }
        self.next - start
    }

    pub fn remaining(&self) -> usize {
        self.times.len() - self.next
    }

    /// Drops every arrival that has not happened yet.
    pub fn clear(&mut self) {
        self.next = self.times.len();
    }
}

/// Resource: customers waiting outside.
#[derive(Resource, Debug, Clone)]
pub struct ArrivalQueue {
    waiting: Vec<CustomerId>,
    capacity: usize,
    admit_interval: f32,
    since_admit: f32,
    next_id: u64,
}

impl ArrivalQueue {
    pub fn new(capacity: usize, admit_interval: f32) -> Self {
        Self {
            waiting: Vec::new(),
            capacity,
            admit_interval,
            since_admit: 0.0,
            next_id: 1,
        }
    }

    pub fn from_config(config: &ArrivalConfig) -> Self {
        Self::new(config.queue_capacity, config.admit_interval)
    }

    /// Hands out the next customer id, queued or not.
    pub fn issue_id(&mut self) -> CustomerId {
        let id = CustomerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Queues a new arrival. Returns None when the queue is full.
    pub fn enqueue(&mut self) -> Option<CustomerId> {
        if self.waiting.len() >= self.capacity {
            return None;
        }
        let id = self.issue_id();
        self.waiting.push(id);
        Some(id)
    }

    pub fn pop(&mut self) -> Option<CustomerId> {
        if self.waiting.is_empty() {
            None
        } else {
            Some(self.waiting.remove(0))
        }
    }

    /// Advances the admission timer. True when an admission attempt is due;
    /// the timer restarts whether or not anyone gets in.
    pub fn admission_due(&mut self, dt: f32) -> bool {
        self.since_admit += dt;
        if self.since_admit >= self.admit_interval {
            self.since_admit = 0.0;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.waiting.clear();
        self.since_admit = 0.0;
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Spawns a body at the entrance and builds the customer that drives it.
pub fn admit_customer(
    id: CustomerId,
    now: SimTimestamp,
    tuning: &FacilityTuning,
    world: &mut dyn FacilityWorld,
    events: &mut EventLog,
) -> Customer {
    let x = tuning.layout.entrance_x;
    world.spawn_body(id, x, 0.0);
    info!(customer = %id, "customer admitted");
    events.record_customer(now, id, EventDetail::CustomerAdmitted { x });
    Customer::new(id, tuning.customer.clone())
}

/// Puts a new arrival in the queue, or turns it away when the queue is full.
pub fn queue_arrival(
    queue: &mut ArrivalQueue,
    now: SimTimestamp,
    events: &mut EventLog,
) -> Option<CustomerId> {
    match queue.enqueue() {
        Some(id) => {
            debug!(customer = %id, queue = queue.len(), "arrival queued");
            events.record_customer(now, id, EventDetail::ArrivalQueued { queue_length: queue.len() });
            Some(id)
        }
        None => {
            debug!(queue = queue.len(), "queue full, arrival turned away");
            events.record_facility(now, EventDetail::ArrivalRejected { queue_length: queue.len() });
            None
        }
    }
}

/// System: turns due spawn times into queued arrivals.
pub fn schedule_arrivals(
    clock: Res<SimClock>,
    mut schedule: ResMut<SpawnSchedule>,
    mut queue: ResMut<ArrivalQueue>,
    mut events: ResMut<EventLog>,
) {
    let due = schedule.due(clock.elapsed());
    for _ in 0..due {
        queue_arrival(&mut queue, clock.now(), &mut events);
    }
}

/// System: lets the head of the queue in when a desk is free.
pub fn admit_arrivals<W: FacilityWorld>(
    mut commands: Commands,
    clock: Res<SimClock>,
    tuning: Res<FacilityTuning>,
    pool: Res<DeskPool>,
    mut queue: ResMut<ArrivalQueue>,
    mut port: ResMut<WorldPort<W>>,
    mut events: ResMut<EventLog>,
) {
    if !queue.admission_due(clock.dt()) || pool.free_count() == 0 {
        return;
    }
    let Some(id) = queue.pop() else {
        return;
    };
    let customer = admit_customer(id, clock.now(), &tuning, &mut port.0, &mut events);
    commands.spawn(customer);
}
