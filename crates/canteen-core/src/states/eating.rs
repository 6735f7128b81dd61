//! Eating: finish the dish, then order again or leave satisfied.

use canteen_events::{CustomerStateKind, EventDetail, FailureReason};

use super::StateContext;
use crate::components::Visit;
use crate::world::Indicator;

#[derive(Debug, Clone, Default)]
pub struct EatingState {
    elapsed: f32,
}

impl EatingState {
    pub fn enter(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) -> Option<CustomerStateKind> {
        self.elapsed = 0.0;
        ctx.world.show_indicator(visit.id, Indicator::eating());
        None
    }

    pub fn execute(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) -> Option<CustomerStateKind> {
        if !visit.holds_desk(ctx.pool) {
            visit.desk = None;
            return visit.fail(FailureReason::DeskLost, ctx);
        }

        self.elapsed += ctx.dt;
        if self.elapsed < visit.profile.eating_time {
            return None;
        }

        visit.completed_orders += 1;
        ctx.events.record_customer(
            ctx.now,
            visit.id,
            EventDetail::MealFinished {
                completed_orders: visit.completed_orders,
            },
        );
        if visit.completed_orders >= visit.profile.orders_required {
            visit.succeed(ctx)
        } else {
            Some(CustomerStateKind::Order)
        }
    }

    pub fn exit(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) {
        ctx.world.hide_indicator(visit.id);
    }
}

#[cfg(test)]
mod tests {
    use super::super::harness::*;
    use super::*;
    use crate::components::Outcome;

    #[test]
    fn test_orders_again_until_satisfied() {
        let mut h = Harness::new();
        h.customer.visit.profile.orders_required = 2;

        assert!(h.run_until(CustomerStateKind::WaitForFood, 800));
        h.world.place_food("ramen", 3.0, 0.0);
        assert!(h.run_until(CustomerStateKind::Eating, 5));
        assert!(h.run_until(CustomerStateKind::Order, 100));
        assert_eq!(h.customer.completed_orders(), 1);
        assert_eq!(h.customer.outcome(), None);

        assert!(h.run_until(CustomerStateKind::WaitForFood, 100));
        h.world.place_food("ramen", 3.0, 0.0);
        assert!(h.run_until(CustomerStateKind::Leave, 100));
        assert_eq!(h.customer.completed_orders(), 2);
        assert_eq!(h.customer.outcome(), Some(Outcome::Success));
    }
}
