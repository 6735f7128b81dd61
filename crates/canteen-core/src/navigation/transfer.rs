//! Climbing between adjacent levels at a staircase.

use canteen_events::CustomerId;

use super::{HorizontalMove, MoveStatus, NavParams, NavigationError};
use crate::components::StairRegistry;
use crate::world::{BodyMode, BodyState, FacilityWorld};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    InProgress,
    Completed,
    /// Could not reach the staircase
    Stuck,
}

#[derive(Debug, Clone, PartialEq)]
enum ClimbPhase {
    Align(HorizontalMove),
    Mount { remaining: f32 },
    Climb,
    Dismount { remaining: f32 },
    Done,
}

/// One level up or down.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelStep {
    from: i32,
    to: i32,
    phase: ClimbPhase,
}

impl LevelStep {
    pub fn begin(from: i32, to: i32, stairs: &StairRegistry) -> Result<Self, NavigationError> {
        if (to - from).abs() != 1 {
            return Err(NavigationError::NotAdjacent { from, to });
        }
        let boundary = StairRegistry::boundary(from, to);
        let transfer_x = stairs
            .transfer_x(boundary)
            .ok_or(NavigationError::NoTransferPoint { boundary })?;
        Ok(Self {
            from,
            to,
            phase: ClimbPhase::Align(HorizontalMove::new(transfer_x)),
        })
    }

    /// True while the body is switched to kinematic.
    pub fn is_climbing(&self) -> bool {
        matches!(self.phase, ClimbPhase::Climb)
    }

    pub fn step(
        &mut self,
        id: CustomerId,
        body: &BodyState,
        dt: f32,
        params: &NavParams<'_>,
        world: &mut dyn FacilityWorld,
    ) -> StepStatus {
        let going_up = self.to > self.from;
        match &mut self.phase {
            ClimbPhase::Align(walk) => match walk.drive(id, body, dt, params.motion, world) {
                MoveStatus::Moving => {}
                MoveStatus::Arrived => {
                    self.phase = ClimbPhase::Mount {
                        remaining: params.climb.mount_pause,
                    };
                }
                MoveStatus::Stuck => return StepStatus::Stuck,
            },
            ClimbPhase::Mount { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    world.set_velocity_x(id, 0.0);
                    world.set_body_mode(id, BodyMode::Kinematic);
                    self.phase = ClimbPhase::Climb;
                }
            }
            ClimbPhase::Climb => {
                // Both directions land slightly above the destination floor
                let landing = self.to as f32 * params.level_height + params.climb.offset;
                let passed = if going_up { body.y > landing } else { body.y < landing };
                if passed {
                    world.set_body_mode(id, BodyMode::Dynamic);
                    self.phase = ClimbPhase::Dismount {
                        remaining: params.climb.dismount_pause,
                    };
                } else {
                    let dy = params.climb.speed * dt;
                    world.shift_vertical(id, if going_up { dy } else { -dy });
                }
            }
            ClimbPhase::Dismount { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    self.phase = ClimbPhase::Done;
                }
            }
            ClimbPhase::Done => {}
        }

        if self.phase == ClimbPhase::Done {
            StepStatus::Completed
        } else {
            StepStatus::InProgress
        }
    }

    /// Stops the step, handing a climbing body back to physics.
    pub fn cancel(&mut self, id: CustomerId, world: &mut dyn FacilityWorld) {
        if self.is_climbing() {
            world.set_body_mode(id, BodyMode::Dynamic);
        }
        world.set_velocity_x(id, 0.0);
        self.phase = ClimbPhase::Done;
    }
}
