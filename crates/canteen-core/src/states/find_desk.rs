//! FindDesk: claim a free desk, wandering until one turns up.

use canteen_events::{CustomerStateKind, DeskId, EventDetail, FailureReason};
use rand::seq::SliceRandom;
use tracing::debug;

use super::{StateContext, Wander};
use crate::components::Visit;

#[derive(Debug, Clone, Default)]
pub struct FindDeskState {
    wander: Wander,
}

impl FindDeskState {
    pub fn enter(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) -> Option<CustomerStateKind> {
        visit.clock.reset_desk_wait();
        if ctx.pool.free_count() == 0 {
            self.wander.start(&ctx.tuning.wander, ctx.rng);
        }
        None
    }

    pub fn execute(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) -> Option<CustomerStateKind> {
        let waited = visit.clock.advance_desk_wait(ctx.dt);
        if let Some(limit) = visit.profile.max_wait_for_desk {
            if waited > limit {
                return visit.fail(FailureReason::DeskTimeout, ctx);
            }
        }

        if claim_desk(visit, ctx) {
            return Some(CustomerStateKind::MoveToDesk);
        }

        let body = ctx.world.body(visit.id)?;
        self.wander.step(visit.id, &body, ctx);
        None
    }

    pub fn exit(&mut self, visit: &mut Visit, ctx: &mut StateContext<'_>) {
        self.wander.stop(visit.id, ctx.world);
    }
}

/// Reserves a random free desk, preferring the customer's own level.
fn claim_desk(visit: &mut Visit, ctx: &mut StateContext<'_>) -> bool {
    let Some(body) = ctx.world.body(visit.id) else {
        return false;
    };
    let level = body.level(ctx.level_height());

    let shunned = visit.shunned_desk;
    let avoid = |desks: Vec<DeskId>| -> Vec<DeskId> {
        desks.into_iter().filter(|d| Some(*d) != shunned).collect()
    };

    let mut candidates = avoid(ctx.pool.free_on_level(level));
    if candidates.is_empty() {
        let anywhere = ctx.pool.free_anywhere();
        candidates = avoid(anywhere.clone());
        if candidates.is_empty() {
            candidates = anywhere;
        }
    }

    let Some(&desk) = candidates.choose(ctx.rng) else {
        return false;
    };
    if let Err(err) = ctx.pool.reserve(desk, visit.id) {
        debug!(customer = %visit.id, error = %err, "reservation refused");
        return false;
    }

    let desk_level = ctx.pool.get(desk).map_or(level, |d| d.level);
    visit.desk = Some(desk);
    visit.shunned_desk = None;
    debug!(customer = %visit.id, %desk, level = desk_level, "desk reserved");
    ctx.events.record_customer(
        ctx.now,
        visit.id,
        EventDetail::DeskReserved {
            desk_id: desk,
            level: desk_level,
        },
    );
    true
}
