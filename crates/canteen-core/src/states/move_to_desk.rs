//! MoveToDesk: walk (and climb) to the reserved desk and sit down.

use canteen_events::{AbandonReason, CustomerStateKind, EventDetail};
use tracing::{debug, warn};

use super::StateContext;
use crate::components::Visit;
use crate::navigation::{NavigationError, Route, RouteStatus};

#[derive(Debug, Clone, Default)]
pub struct MoveToDeskState {
    route: Option<Route>,
    desk_x: f32,
    desk_level: i32,
    stalls: u32,
}

impl MoveToDeskState {
    pub fn enter(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) -> Option<CustomerStateKind> {
        if !visit.holds_desk(ctx.pool) {
            warn!(customer = %visit.id, "heading for a desk it does not hold");
            visit.abandon_desk(AbandonReason::DeskLost, ctx);
            return Some(CustomerStateKind::FindDesk);
        }
        let desk = visit.desk.and_then(|id| ctx.pool.get(id))?;
        self.desk_x = desk.x;
        self.desk_level = desk.level;
        self.route = Some(Route::new(desk.level, desk.x));
        None
    }

    pub fn execute(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) -> Option<CustomerStateKind> {
        if !visit.holds_desk(ctx.pool) {
            self.cancel_route(visit, ctx);
            visit.abandon_desk(AbandonReason::DeskLost, ctx);
            return Some(CustomerStateKind::FindDesk);
        }
        let desk = visit.desk.and_then(|id| ctx.pool.get(id))?;
        let (desk_x, desk_level) = (desk.x, desk.level);

        if desk_level != self.desk_level
            || (desk_x - self.desk_x).abs() > visit.profile.replan_distance
        {
            debug!(customer = %visit.id, desk_x, desk_level, "desk moved, replanning");
            self.cancel_route(visit, ctx);
            self.desk_x = desk_x;
            self.desk_level = desk_level;
            self.route = Some(Route::new(desk_level, desk_x));
        }

        let body = ctx.world.body(visit.id)?;
        let params = ctx.nav();
        let route = self.route.get_or_insert_with(|| Route::new(desk_level, desk_x));
        match route.step(visit.id, &body, ctx.dt, ctx.stairs, &params, ctx.world) {
            RouteStatus::InProgress | RouteStatus::LevelChanged => None,
            RouteStatus::Arrived => {
                if self.on_desk(visit, ctx) {
                    self.sit(visit, ctx)
                } else {
                    visit.abandon_desk(AbandonReason::Stuck, ctx);
                    Some(CustomerStateKind::FindDesk)
                }
            }
            RouteStatus::Stuck => {
                self.stalls += 1;
                debug!(customer = %visit.id, stalls = self.stalls, "stuck on the way to desk");
                ctx.events.record_customer(
                    ctx.now,
                    visit.id,
                    EventDetail::NavigationStuck { target_x: desk_x },
                );
                if self.on_desk(visit, ctx) {
                    self.sit(visit, ctx)
                } else if self.stalls > ctx.tuning.motion.stuck_retries {
                    visit.abandon_desk(AbandonReason::Stuck, ctx);
                    Some(CustomerStateKind::FindDesk)
                } else {
                    None
                }
            }
            RouteStatus::Failed(NavigationError::NoTransferPoint { boundary }) => {
                if ctx.faults.first_missing_stairs(boundary) {
                    warn!(boundary, "no staircase registered between levels {} and {}", boundary, boundary + 1);
                }
                ctx.events
                    .record_customer(ctx.now, visit.id, EventDetail::NoTransferPoint { boundary });
                self.route = None;
                visit.abandon_desk(AbandonReason::NoTransferPoint, ctx);
                Some(CustomerStateKind::FindDesk)
            }
            RouteStatus::Failed(err) => {
                warn!(customer = %visit.id, error = %err, "route failed");
                self.route = None;
                visit.abandon_desk(AbandonReason::Stuck, ctx);
                Some(CustomerStateKind::FindDesk)
            }
        }
    }

    pub fn exit(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) {
        self.cancel_route(visit, ctx);
    }

    fn cancel_route(&mut self, visit: &Visit, ctx: &mut StateContext<'_>) {
        if let Some(mut route) = self.route.take() {
            route.cancel(visit.id, ctx.world);
        }
    }

    fn on_desk(&self, visit: &Visit, ctx: &StateContext<'_>) -> bool {
        let (Some(body), Some(desk)) = (
            ctx.world.body(visit.id),
            visit.desk.and_then(|id| ctx.pool.get(id)),
        ) else {
            return false;
        };
        body.level(ctx.level_height()) == desk.level
            && (body.x - desk.x).abs() <= visit.profile.seat_tolerance
    }

    fn sit(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) -> Option<CustomerStateKind> {
        let desk_id = visit.desk?;
        if let Err(err) = ctx.pool.occupy(desk_id, visit.id) {
            debug!(customer = %visit.id, error = %err, "could not take seat");
            visit.abandon_desk(AbandonReason::DeskLost, ctx);
            return Some(CustomerStateKind::FindDesk);
        }
        let desk = ctx.pool.get(desk_id)?;
        ctx.world.seat(visit.id, desk.x, desk.y);
        self.route = None;
        ctx.events
            .record_customer(ctx.now, visit.id, EventDetail::Seated { desk_id });
        Some(CustomerStateKind::Order)
    }
}

#[cfg(test)]
mod tests {
    use super::super::harness::*;
    use super::*;
    use crate::world::{BodyMode, BodySensor};
    use canteen_events::{DeskId, DeskStatus};

    fn abandon_reasons(h: &Harness) -> Vec<AbandonReason> {
        h.events
            .pending()
            .iter()
            .filter_map(|e| match e.detail {
                EventDetail::DeskAbandoned { reason, .. } => Some(reason),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_walks_to_desk_and_sits() {
        let mut h = Harness::new();
        assert!(h.run_until(CustomerStateKind::Order, 600));
        assert_eq!(h.pool.get(DeskId(0)).unwrap().status(), DeskStatus::Occupied);
        assert!(h.world.is_seated(h.id()));
        assert_eq!(h.world.body(h.id()).unwrap().x, 3.0);
    }

    #[test]
    fn test_missing_staircase_releases_desk() {
        let mut h = Harness::new();
        h.pool.remove_desk(DeskId(0));
        h.pool.add_desk(DeskId(5), 4.0, 6.0);
        h.stairs.register(0, 2.0);

        let mut failed = false;
        for _ in 0..1200 {
            h.tick();
            if abandon_reasons(&h).contains(&AbandonReason::NoTransferPoint) {
                failed = true;
                break;
            }
        }
        assert!(failed);
        assert_eq!(h.customer.kind(), CustomerStateKind::FindDesk);
        assert_eq!(h.customer.desk(), None);
        assert!(h.pool.get(DeskId(5)).unwrap().is_free());
        assert_eq!(h.world.body(h.id()).unwrap().level(3.0), 1);
        assert!(h.events.pending().iter().any(|e| e.detail == EventDetail::NoTransferPoint { boundary: 1 }));
    }

    #[test]
    fn test_blocked_customer_gives_up_desk() {
        let mut h = Harness::new();
        h.tick();
        h.world.block(h.id(), true);
        for _ in 0..300 {
            h.tick();
            if h.customer.kind() == CustomerStateKind::FindDesk {
                break;
            }
        }
        assert_eq!(h.customer.kind(), CustomerStateKind::FindDesk);
        assert_eq!(abandon_reasons(&h), vec![AbandonReason::Stuck]);
        assert!(h.pool.get(DeskId(0)).unwrap().is_free());
    }

    #[test]
    fn test_removed_desk_sends_customer_back() {
        let mut h = Harness::new();
        h.tick();
        h.tick();
        h.pool.remove_desk(DeskId(0));
        h.tick();
        assert_eq!(h.customer.kind(), CustomerStateKind::FindDesk);
        assert_eq!(abandon_reasons(&h), vec![AbandonReason::DeskLost]);
    }

    #[test]
    fn test_replans_when_desk_moves() {
        let mut h = Harness::new();
        for _ in 0..5 {
            h.tick();
        }
        h.pool.move_desk(DeskId(0), 8.0, 0.0).unwrap();
        assert!(h.run_until(CustomerStateKind::Order, 900));
        assert_eq!(h.world.body(h.id()).unwrap().x, 8.0);
    }

    #[test]
    fn test_held_customer_waits() {
        let mut h = Harness::new();
        h.tick();
        h.world.hold(h.id(), true);
        for _ in 0..300 {
            h.tick();
        }
        assert_eq!(h.customer.kind(), CustomerStateKind::MoveToDesk);
        assert_eq!(h.world.body(h.id()).unwrap().x, 0.5);

        h.world.hold(h.id(), false);
        assert!(h.run_until(CustomerStateKind::Order, 600));
    }

    #[test]
    fn test_exit_mid_climb_restores_body() {
        let mut h = Harness::new();
        h.pool.remove_desk(DeskId(0));
        h.pool.add_desk(DeskId(5), 4.0, 3.0);
        h.stairs.register(0, 0.5);
        for _ in 0..600 {
            h.tick();
            if h.world.body_mode(h.id()) == Some(BodyMode::Kinematic) {
                break;
            }
        }
        assert_eq!(h.world.body_mode(h.id()), Some(BodyMode::Kinematic));

        h.pool.remove_desk(DeskId(5));
        h.tick();
        assert_eq!(h.customer.kind(), CustomerStateKind::FindDesk);
        assert_eq!(h.world.body_mode(h.id()), Some(BodyMode::Dynamic));
    }
}
