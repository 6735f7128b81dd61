//! WaitForFood: wait at the desk until the ordered dish shows up.

use canteen_events::{CustomerStateKind, EventDetail, FailureReason};

use super::StateContext;
use crate::components::{Order, Visit};
use crate::world::Indicator;

#[derive(Debug, Clone, Default)]
pub struct WaitForFoodState;

impl WaitForFoodState {
    pub fn enter(&mut self, visit: &mut Visit, _ctx: &mut StateContext<'_>) -> Option<CustomerStateKind> {
        visit.clock.reset_food_wait();
        None
    }

    pub fn execute(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) -> Option<CustomerStateKind> {
        if !visit.holds_desk(ctx.pool) {
            visit.desk = None;
            return visit.fail(FailureReason::DeskLost, ctx);
        }

        let dish = match &visit.order {
            Some(Order::Dish(dish)) => dish.clone(),
            Some(Order::Unavailable) | None => {
                return visit.fail(FailureReason::NoOrderAvailable, ctx);
            }
        };

        // Runs even while the customer is held or outside
        let waited = visit.clock.advance_food_wait(ctx.dt);
        let limit = visit.profile.max_wait_for_food;
        if waited > limit {
            return visit.fail(FailureReason::FoodTimeout, ctx);
        }

        ctx.world
            .show_indicator(visit.id, Indicator::order(dish.as_str(), urgency(waited, limit)));

        if ctx.world.take_food_nearby(visit.id, &dish) {
            ctx.events
                .record_customer(ctx.now, visit.id, EventDetail::FoodServed { dish });
            return Some(CustomerStateKind::Eating);
        }
        None
    }

    pub fn exit(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) {
        ctx.world.hide_indicator(visit.id);
    }
}

/// Calm for the first third of the wait, then rising linearly to 1.
pub fn urgency(waited: f32, limit: f32) -> f32 {
    let calm = limit / 3.0;
    if waited <= calm || limit <= 0.0 {
        return 0.0;
    }
    ((waited - calm) / (limit - calm)).min(1.0)
}
