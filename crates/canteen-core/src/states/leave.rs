//! Leave: give the desk back, go down to the ground floor and out.

use canteen_events::{CustomerStateKind, EventDetail};
use tracing::{debug, warn};

use super::StateContext;
use crate::components::Visit;
use crate::navigation::{HorizontalMove, LevelStep, MoveStatus, NavigationError, StepStatus};
use crate::world::BodyMode;

#[derive(Debug, Clone, Default)]
enum LeavePhase {
    #[default]
    Descend,
    Climbing(LevelStep),
    Exit(HorizontalMove),
    Gone,
}

#[derive(Debug, Clone, Default)]
pub struct LeaveState {
    phase: LeavePhase,
    stalls: u32,
}

impl LeaveState {
    pub fn enter(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) -> Option<CustomerStateKind> {
        ctx.world.hide_indicator(visit.id);
        if let Some(desk) = ctx.pool.release_held_by(visit.id) {
            debug!(customer = %visit.id, %desk, "desk released on leaving");
        }
        visit.desk = None;
        ctx.world.unseat(visit.id);
        ctx.world.set_body_mode(visit.id, BodyMode::Dynamic);
        ctx.world.set_velocity_x(visit.id, 0.0);
        self.phase = LeavePhase::Descend;
        self.stalls = 0;
        None
    }

    pub fn execute(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) -> Option<CustomerStateKind> {
        if matches!(self.phase, LeavePhase::Gone) {
            return None;
        }
        let body = ctx.world.body(visit.id)?;
        if !ctx.world.is_inside_facility(visit.id) {
            return self.depart(visit, ctx);
        }

        let params = ctx.nav();
        match &mut self.phase {
            LeavePhase::Descend => {
                let level = body.level(params.level_height);
                if level <= 0 {
                    self.phase = LeavePhase::Exit(HorizontalMove::new(ctx.tuning.layout.exit_x));
                    return None;
                }
                match LevelStep::begin(level, level - 1, ctx.stairs) {
                    Ok(step) => self.phase = LeavePhase::Climbing(step),
                    Err(NavigationError::NoTransferPoint { boundary }) => {
                        if ctx.faults.first_missing_stairs(boundary) {
                            warn!(boundary, "no staircase down from level {}, customers leave in place", level);
                        }
                        ctx.events.record_customer(
                            ctx.now,
                            visit.id,
                            EventDetail::NoTransferPoint { boundary },
                        );
                        return self.depart(visit, ctx);
                    }
                    Err(err) => {
                        warn!(customer = %visit.id, error = %err, "cannot descend");
                        return self.depart(visit, ctx);
                    }
                }
                None
            }
            LeavePhase::Climbing(step) => {
                match step.step(visit.id, &body, ctx.dt, &params, ctx.world) {
                    StepStatus::InProgress => None,
                    StepStatus::Completed => {
                        self.phase = LeavePhase::Descend;
                        None
                    }
                    StepStatus::Stuck => {
                        self.stalls += 1;
                        debug!(customer = %visit.id, stalls = self.stalls, "stuck on the way to the stairs");
                        if self.stalls > ctx.tuning.motion.stuck_retries {
                            return self.depart(visit, ctx);
                        }
                        self.phase = LeavePhase::Descend;
                        None
                    }
                }
            }
            LeavePhase::Exit(walk) => {
                match walk.drive(visit.id, &body, ctx.dt, params.motion, ctx.world) {
                    MoveStatus::Moving => None,
                    MoveStatus::Arrived | MoveStatus::Stuck => self.depart(visit, ctx),
                }
            }
            LeavePhase::Gone => None,
        }
    }

    pub fn exit(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) {
        if let LeavePhase::Climbing(step) = &mut self.phase {
            step.cancel(visit.id, ctx.world);
        }
    }

    fn depart(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) -> Option<CustomerStateKind> {
        self.phase = LeavePhase::Gone;
        ctx.world.set_velocity_x(visit.id, 0.0);
        visit.departed = true;
        debug!(customer = %visit.id, "customer left");
        ctx.events
            .record_customer(ctx.now, visit.id, EventDetail::CustomerLeft);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::super::harness::*;
    use super::*;
    use crate::components::Outcome;
    use crate::world::BodySensor;
    use canteen_events::{DeskId, FailureReason};

    #[test]
    fn test_walks_out_after_timeout() {
        let mut h = Harness::new();
        h.tuning.layout.exit_x = -3.0;
        assert!(h.run_until(CustomerStateKind::WaitForFood, 800));
        assert!(h.run_until(CustomerStateKind::Leave, 400));
        assert!(!h.world.is_seated(h.id()));
        assert!(h.pool.get(DeskId(0)).unwrap().is_free());

        for _ in 0..600 {
            h.tick();
            if h.customer.has_departed() {
                break;
            }
        }
        assert!(h.customer.has_departed());
        // Bounds start at -1: the customer is out before reaching the exit
        let x = h.world.body(h.id()).unwrap().x;
        assert!(x < -1.0 && x > -3.0);
        assert_eq!(
            h.customer.outcome(),
            Some(Outcome::Failure(FailureReason::FoodTimeout))
        );
    }

    #[test]
    fn test_descends_before_exiting() {
        let mut h = Harness::new();
        h.tuning.layout.exit_x = 0.0;
        h.pool.remove_desk(DeskId(0));
        h.pool.add_desk(DeskId(1), 4.0, 3.0);
        h.stairs.register(0, 2.0);
        assert!(h.run_until(CustomerStateKind::WaitForFood, 1200));
        assert_eq!(h.world.body(h.id()).unwrap().level(3.0), 1);

        h.world.place_food("ramen", 4.0, 3.0);
        assert!(h.run_until(CustomerStateKind::Leave, 200));
        for _ in 0..1200 {
            h.tick();
            if h.customer.has_departed() {
                break;
            }
        }
        assert!(h.customer.has_departed());
        let body = h.world.body(h.id()).unwrap();
        assert_eq!(body.level(3.0), 0);
        assert_eq!(body.x, 0.0);
    }

    #[test]
    fn test_no_way_down_leaves_in_place() {
        let mut h = Harness::new();
        h.pool.remove_desk(DeskId(0));
        h.pool.add_desk(DeskId(1), 4.0, 3.0);
        h.stairs.register(0, 2.0);
        assert!(h.run_until(CustomerStateKind::Order, 1200));

        h.stairs.remove(0);
        h.pool.release_all();
        h.tick();
        assert_eq!(h.customer.kind(), CustomerStateKind::Leave);
        h.tick();
        assert!(h.customer.has_departed());
        assert_eq!(h.world.body(h.id()).unwrap().level(3.0), 1);
    }

    #[test]
    fn test_blocked_on_the_way_down_leaves_in_place() {
        let mut h = Harness::new();
        h.pool.remove_desk(DeskId(0));
        h.pool.add_desk(DeskId(1), 4.0, 3.0);
        h.stairs.register(0, 2.0);
        assert!(h.run_until(CustomerStateKind::Order, 1200));

        h.pool.release_all();
        h.tick();
        assert_eq!(h.customer.kind(), CustomerStateKind::Leave);
        let id = h.id();
        h.world.block(id, true);

        // Each stall takes the stuck timeout; the retries run out well within this
        for _ in 0..300 {
            h.tick();
            if h.customer.has_departed() {
                break;
            }
        }
        assert!(h.customer.has_departed());
        let body = h.world.body(id).unwrap();
        assert_eq!(body.level(3.0), 1);
        assert_eq!(body.x, 4.0);
    }
}
