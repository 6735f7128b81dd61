//! Idle wandering while no desk is free.

use canteen_events::CustomerId;
use rand::rngs::SmallRng;
use rand::Rng;

use super::StateContext;
use crate::config::WanderParams;
use crate::navigation::{HorizontalMove, MoveStatus};
use crate::world::{BodyState, FacilityWorld};

#[derive(Debug, Clone, Default, PartialEq)]
enum WanderPhase {
    #[default]
    Idle,
    Walking(HorizontalMove),
    Resting { remaining: f32 },
}

/// Walk to a random spot, rest a while, repeat.
#[derive(Debug, Clone, Default)]
pub struct Wander {
    phase: WanderPhase,
}

impl Wander {
    pub fn start(&mut self, params: &WanderParams, rng: &mut SmallRng) {
        let x = rng.gen_range(params.min_x..=params.max_x);
        self.phase = WanderPhase::Walking(HorizontalMove::new(x));
    }

    pub fn step(&mut self, id: CustomerId, body: &BodyState, ctx: &mut StateContext<'_>) {
        let params = &ctx.tuning.wander;
        match &mut self.phase {
            WanderPhase::Idle => self.start(params, ctx.rng),
            WanderPhase::Walking(walk) => {
                if walk.drive(id, body, ctx.dt, &ctx.tuning.motion, ctx.world) != MoveStatus::Moving {
                    let rest = ctx.rng.gen_range(params.min_rest..=params.max_rest);
                    self.phase = WanderPhase::Resting { remaining: rest };
                }
            }
            WanderPhase::Resting { remaining } => {
                *remaining -= ctx.dt;
                if *remaining <= 0.0 {
                    self.start(params, ctx.rng);
                }
            }
        }
    }

    pub fn stop(&mut self, id: CustomerId, world: &mut dyn FacilityWorld) {
        world.set_velocity_x(id, 0.0);
        self.phase = WanderPhase::Idle;
    }
}
