//! Customer State Machine
//!
//! Each customer is always in exactly one state. A state gets `enter` once,
//! `execute` once per tick, and `exit` before the next state's `enter`. Each
//! returns the next state to switch to, if any. Whatever a state is waiting
//! on (a route, a timer, food) is plain data inside it and disappears with
//! the state.

mod eating;
mod find_desk;
mod leave;
mod move_to_desk;
mod order;
mod wait_for_food;
mod wander;

pub use eating::EatingState;
pub use find_desk::FindDeskState;
pub use leave::LeaveState;
pub use move_to_desk::MoveToDeskState;
pub use order::OrderState;
pub use wait_for_food::WaitForFoodState;
pub use wander::Wander;

use canteen_events::{
    AbandonReason, CustomerStateKind, EventDetail, FailureReason, SimTimestamp,
};
use rand::rngs::SmallRng;
use tracing::{debug, info, warn};

use crate::components::{
    Customer, DeskPool, FacilityController, FacilityTuning, FaultLog, OrderCatalog, Outcome,
    StairRegistry, Visit,
};
use crate::events::EventLog;
use crate::navigation::NavParams;
use crate::world::FacilityWorld;

/// Chained transitions allowed for one customer in one tick.
pub const MAX_TRANSITIONS_PER_TICK: usize = 8;

/// What a state may touch while it runs.
pub struct StateContext<'a> {
    pub now: SimTimestamp,
    pub dt: f32,
    pub tuning: &'a FacilityTuning,
    pub stairs: &'a StairRegistry,
    pub catalog: &'a OrderCatalog,
    pub pool: &'a mut DeskPool,
    pub world: &'a mut dyn FacilityWorld,
    pub rng: &'a mut SmallRng,
    pub controller: &'a mut FacilityController,
    pub faults: &'a mut FaultLog,
    pub events: &'a mut EventLog,
}

impl<'a> StateContext<'a> {
    pub fn nav(&self) -> NavParams<'a> {
        let tuning: &'a FacilityTuning = self.tuning;
        tuning.nav()
    }

    pub fn level_height(&self) -> f32 {
        self.tuning.layout.level_height
    }
}

#[derive(Debug, Clone)]
pub enum CustomerState {
    FindDesk(FindDeskState),
    MoveToDesk(MoveToDeskState),
    Order(OrderState),
    WaitForFood(WaitForFoodState),
    Eating(EatingState),
    Leave(LeaveState),
}

impl CustomerState {
    /// A state that has not been entered yet.
    pub fn fresh(kind: CustomerStateKind) -> Self {
        match kind {
            CustomerStateKind::FindDesk => CustomerState::FindDesk(FindDeskState::default()),
            CustomerStateKind::MoveToDesk => CustomerState::MoveToDesk(MoveToDeskState::default()),
            CustomerStateKind::Order => CustomerState::Order(OrderState::default()),
            CustomerStateKind::WaitForFood => CustomerState::WaitForFood(WaitForFoodState::default()),
            CustomerStateKind::Eating => CustomerState::Eating(EatingState::default()),
            CustomerStateKind::Leave => CustomerState::Leave(LeaveState::default()),
        }
    }

    pub fn kind(&self) -> CustomerStateKind {
        match self {
            CustomerState::FindDesk(_) => CustomerStateKind::FindDesk,
            CustomerState::MoveToDesk(_) => CustomerStateKind::MoveToDesk,
            CustomerState::Order(_) => CustomerStateKind::Order,
            CustomerState::WaitForFood(_) => CustomerStateKind::WaitForFood,
            CustomerState::Eating(_) => CustomerStateKind::Eating,
            CustomerState::Leave(_) => CustomerStateKind::Leave,
        }
    }

    fn enter(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) -> Option<CustomerStateKind> {
        match self {
            CustomerState::FindDesk(s) => s.enter(visit, ctx),
            CustomerState::MoveToDesk(s) => s.enter(visit, ctx),
            CustomerState::Order(s) => s.enter(visit, ctx),
            CustomerState::WaitForFood(s) => s.enter(visit, ctx),
            CustomerState::Eating(s) => s.enter(visit, ctx),
            CustomerState::Leave(s) => s.enter(visit, ctx),
        }
    }

    fn execute(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) -> Option<CustomerStateKind> {
        match self {
            CustomerState::FindDesk(s) => s.execute(visit, ctx),
            CustomerState::MoveToDesk(s) => s.execute(visit, ctx),
            CustomerState::Order(s) => s.execute(visit, ctx),
            CustomerState::WaitForFood(s) => s.execute(visit, ctx),
            CustomerState::Eating(s) => s.execute(visit, ctx),
            CustomerState::Leave(s) => s.execute(visit, ctx),
        }
    }

    fn exit(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) {
        match self {
            CustomerState::FindDesk(s) => s.exit(visit, ctx),
            CustomerState::MoveToDesk(s) => s.exit(visit, ctx),
            CustomerState::Order(s) => s.exit(visit, ctx),
            CustomerState::WaitForFood(s) => s.exit(visit, ctx),
            CustomerState::Eating(s) => s.exit(visit, ctx),
            CustomerState::Leave(s) => s.exit(visit, ctx),
        }
    }
}

impl Customer {
    /// Runs one tick of this customer's state machine.
    pub fn update(&mut self, ctx: &mut StateContext<'_>) {
        if !self.started {
            self.started = true;
            let next = self.state.enter(&mut self.visit, ctx);
            if next.is_some() {
                self.follow(next, ctx);
                return;
            }
        }
        let next = self.state.execute(&mut self.visit, ctx);
        self.follow(next, ctx);
    }

    fn follow(&mut self, mut next: Option<CustomerStateKind>, ctx: &mut StateContext<'_>) {
        let mut hops = 0;
        while let Some(to) = next {
            if hops == MAX_TRANSITIONS_PER_TICK {
                warn!(customer = %self.visit.id, state = %self.state.kind(), pending = %to,
                    "transition limit reached, deferring to next tick");
                return;
            }
            hops += 1;

            let from = self.state.kind();
            self.state.exit(&mut self.visit, ctx);
            self.state = CustomerState::fresh(to);
            debug!(customer = %self.visit.id, %from, %to, "state change");
            ctx.events
                .record_customer(ctx.now, self.visit.id, EventDetail::StateChanged { from, to });
            next = self.state.enter(&mut self.visit, ctx);
        }
    }

    /// Handles a customer whose body disappeared or who is taken out by the
    /// host. Frees the desk at once and counts a failure unless the visit
    /// already ended.
    pub fn remove(
        &mut self,
        now: SimTimestamp,
        pool: &mut DeskPool,
        controller: &mut FacilityController,
        events: &mut EventLog,
    ) {
        if self.visit.departed {
            return;
        }
        if let Some(desk) = pool.release_held_by(self.visit.id) {
            debug!(customer = %self.visit.id, %desk, "desk freed on removal");
        }
        self.visit.desk = None;
        self.visit
            .report(Outcome::Failure(FailureReason::Removed), now, controller, events);
        self.visit.departed = true;
        events.record_customer(now, self.visit.id, EventDetail::CustomerRemoved);
    }
}

impl Visit {
    /// Records how the visit ended. Only the first report counts.
    pub fn report(
        &mut self,
        outcome: Outcome,
        now: SimTimestamp,
        controller: &mut FacilityController,
        events: &mut EventLog,
    ) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(outcome);
        match outcome {
            Outcome::Success => {
                if controller.report_success(self.id) {
                    info!(customer = %self.id, meals = self.completed_orders, "customer satisfied");
                    events.record_customer(now, self.id, EventDetail::CustomerSucceeded);
                }
            }
            Outcome::Failure(reason) => {
                if controller.report_failure(self.id) {
                    info!(customer = %self.id, ?reason, "customer gave up");
                    events.record_customer(now, self.id, EventDetail::CustomerFailed { reason });
                }
            }
        }
    }

    pub(crate) fn succeed(&mut self, ctx: &mut StateContext<'_>) -> Option<CustomerStateKind> {
        self.report(Outcome::Success, ctx.now, ctx.controller, ctx.events);
        Some(CustomerStateKind::Leave)
    }

    pub(crate) fn fail(
        &mut self,
        reason: FailureReason,
        ctx: &mut StateContext<'_>,
    ) -> Option<CustomerStateKind> {
        self.report(Outcome::Failure(reason), ctx.now, ctx.controller, ctx.events);
        Some(CustomerStateKind::Leave)
    }

    /// True if the pool still has this customer's desk under its name.
    pub(crate) fn holds_desk(&self, pool: &DeskPool) -> bool {
        self.desk.map_or(false, |desk| pool.is_held_by(desk, self.id))
    }

    /// Gives up the desk this customer was heading for.
    pub(crate) fn abandon_desk(&mut self, reason: AbandonReason, ctx: &mut StateContext<'_>) {
        let Some(desk) = self.desk.take() else {
            return;
        };
        if reason != AbandonReason::DeskLost {
            if let Err(err) = ctx.pool.release(desk, self.id) {
                debug!(customer = %self.id, error = %err, "desk already gone");
            }
        }
        self.shunned_desk = Some(desk);
        debug!(customer = %self.id, %desk, ?reason, "desk abandoned");
        ctx.events.record_customer(
            ctx.now,
            self.id,
            EventDetail::DeskAbandoned { desk_id: desk, reason },
        );
    }
}

#[cfg(test)]
pub(crate) mod harness {
    //! A single customer with its own resources, for state-level tests.

    use super::*;
    use crate::config::CanteenConfig;
    use crate::headless::HeadlessWorld;
    use crate::world::Actuator;
    use canteen_events::{CustomerId, DeskId};
    use rand::SeedableRng;

    pub const DT: f32 = 1.0 / 60.0;

    pub struct Harness {
        pub now: SimTimestamp,
        pub tuning: FacilityTuning,
        pub stairs: StairRegistry,
        pub catalog: OrderCatalog,
        pub pool: DeskPool,
        pub world: HeadlessWorld,
        pub rng: SmallRng,
        pub controller: FacilityController,
        pub faults: FaultLog,
        pub events: EventLog,
        pub customer: Customer,
    }

    impl Harness {
        /// One desk at x = 3 on level 0, one dish, no stairs.
        pub fn new() -> Self {
            let mut config = CanteenConfig::default();
            config.customer.order_time = 1.0;
            config.customer.eating_time = 1.0;
            config.customer.max_wait_for_food = 5.0;
            let tuning = FacilityTuning::from_config(&config);

            let mut pool = DeskPool::new(tuning.layout.level_height);
            pool.add_desk(DeskId(0), 3.0, 0.0);
            let mut catalog = OrderCatalog::new();
            catalog.insert("ramen", 1.0).unwrap();

            let id = CustomerId(1);
            let mut world = HeadlessWorld::new(3.0, -1.0, 20.0);
            world.spawn_body(id, 0.5, 0.0);

            Self {
                now: SimTimestamp::start(),
                customer: Customer::new(id, tuning.customer.clone()),
                tuning,
                stairs: StairRegistry::new(),
                catalog,
                pool,
                world,
                rng: SmallRng::seed_from_u64(7),
                controller: FacilityController::new(),
                faults: FaultLog::default(),
                events: EventLog::new(),
            }
        }

        pub fn id(&self) -> CustomerId {
            self.customer.id()
        }

        pub fn tick(&mut self) {
            self.now.advance(DT as f64);
            let mut ctx = StateContext {
                now: self.now,
                dt: DT,
                tuning: &self.tuning,
                stairs: &self.stairs,
                catalog: &self.catalog,
                pool: &mut self.pool,
                world: &mut self.world,
                rng: &mut self.rng,
                controller: &mut self.controller,
                faults: &mut self.faults,
                events: &mut self.events,
            };
            self.customer.update(&mut ctx);
            self.world.integrate(DT);
        }

        /// Ticks until the customer reaches `kind`, up to `max_ticks`.
        pub fn run_until(&mut self, kind: CustomerStateKind, max_ticks: usize) -> bool {
            for _ in 0..max_ticks {
                if self.customer.kind() == kind {
                    return true;
                }
                self.tick();
            }
            self.customer.kind() == kind
        }
    }
}

#[cfg(test)]
mod tests {
    use super::harness::*;
    use super::*;
    use canteen_events::{DeskId, DeskStatus};

    #[test]
    fn test_full_visit_with_served_food() {
        let mut h = Harness::new();
        assert!(h.run_until(CustomerStateKind::WaitForFood, 600));
        assert_eq!(h.pool.get(DeskId(0)).unwrap().status(), DeskStatus::Occupied);

        h.world.place_food("ramen", 3.0, 0.0);
        assert!(h.run_until(CustomerStateKind::Leave, 600));
        assert_eq!(h.customer.outcome(), Some(Outcome::Success));
        assert_eq!(h.customer.completed_orders(), 1);
        assert_eq!(h.controller.outcomes().successes, 1);
        assert!(h.pool.get(DeskId(0)).unwrap().is_free());
    }

    #[test]
    fn test_transitions_are_recorded_in_order() {
        let mut h = Harness::new();
        assert!(h.run_until(CustomerStateKind::Order, 600));
        let transitions: Vec<(CustomerStateKind, CustomerStateKind)> = h
            .events
            .pending()
            .iter()
            .filter_map(|e| match e.detail {
                EventDetail::StateChanged { from, to } => Some((from, to)),
                _ => None,
            })
            .collect();
        assert_eq!(
            transitions,
            vec![
                (CustomerStateKind::FindDesk, CustomerStateKind::MoveToDesk),
                (CustomerStateKind::MoveToDesk, CustomerStateKind::Order),
            ]
        );
    }

    #[test]
    fn test_removal_reports_once_and_frees_desk() {
        let mut h = Harness::new();
        assert!(h.run_until(CustomerStateKind::MoveToDesk, 10));
        h.customer
            .remove(h.now, &mut h.pool, &mut h.controller, &mut h.events);
        h.customer
            .remove(h.now, &mut h.pool, &mut h.controller, &mut h.events);
        assert!(h.pool.get(DeskId(0)).unwrap().is_free());
        assert_eq!(h.controller.outcomes().failures, 1);
        assert_eq!(
            h.customer.outcome(),
            Some(Outcome::Failure(FailureReason::Removed))
        );
        assert!(h.customer.has_departed());

        let removals = h
            .events
            .pending()
            .iter()
            .filter(|e| e.detail == EventDetail::CustomerRemoved)
            .count();
        assert_eq!(removals, 1);
    }

    #[test]
    fn test_second_report_is_ignored() {
        let mut h = Harness::new();
        let id = h.id();
        let mut visit = Visit::new(id, h.tuning.customer.clone());
        visit.report(Outcome::Success, h.now, &mut h.controller, &mut h.events);
        visit.report(
            Outcome::Failure(FailureReason::FoodTimeout),
            h.now,
            &mut h.controller,
            &mut h.events,
        );
        assert_eq!(visit.outcome, Some(Outcome::Success));
        assert_eq!(h.controller.outcomes().successes, 1);
        assert_eq!(h.controller.outcomes().failures, 0);
    }
}
