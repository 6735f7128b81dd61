//! Order: think for a while, then pick a dish.

use canteen_events::{CustomerStateKind, EventDetail, FailureReason};

use super::StateContext;
use crate::components::Visit;
use crate::world::Indicator;

#[derive(Debug, Clone, Default)]
pub struct OrderState {
    elapsed: f32,
}

impl OrderState {
    pub fn enter(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) -> Option<CustomerStateKind> {
        self.elapsed = 0.0;
        visit.order = None;
        ctx.world.show_indicator(visit.id, Indicator::thinking());
        None
    }

    pub fn execute(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) -> Option<CustomerStateKind> {
        if !visit.holds_desk(ctx.pool) {
            visit.desk = None;
            return visit.fail(FailureReason::DeskLost, ctx);
        }

        self.elapsed += ctx.dt;
        if self.elapsed < visit.profile.order_time {
            return None;
        }

        let order = ctx.catalog.draw(ctx.rng);
        ctx.events.record_customer(
            ctx.now,
            visit.id,
            EventDetail::OrderPlaced {
                dish: order.dish().map(str::to_string),
            },
        );
        visit.order = Some(order);
        Some(CustomerStateKind::WaitForFood)
    }

    pub fn exit(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) {
        ctx.world.hide_indicator(visit.id);
    }
}
