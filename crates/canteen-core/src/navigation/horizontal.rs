//! Horizontal movement toward a target x.

use canteen_events::CustomerId;

use super::move_towards;
use crate::config::MotionParams;
use crate::world::{BodyState, FacilityWorld};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStatus {
    Moving,
    Arrived,
    /// No progress for the stuck timeout; the move is over
    Stuck,
}

/// What the host should do with the body this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveCommand {
    pub status: MoveStatus,
    /// `None` leaves the velocity to whoever holds the body
    pub velocity_x: Option<f32>,
    pub snap_x: Option<f32>,
}

/// An active walk to `target_x`.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizontalMove {
    target_x: f32,
    last_x: Option<f32>,
    stalled_for: f32,
}

impl HorizontalMove {
    pub fn new(target_x: f32) -> Self {
        Self {
            target_x,
            last_x: None,
            stalled_for: 0.0,
        }
    }

    pub fn target_x(&self) -> f32 {
        self.target_x
    }

    /// Computes this tick's velocity command from the observed body.
    pub fn step(&mut self, body: &BodyState, held: bool, dt: f32, params: &MotionParams) -> MoveCommand {
        if held {
            self.last_x = Some(body.x);
            self.stalled_for = 0.0;
            return MoveCommand {
                status: MoveStatus::Moving,
                velocity_x: None,
                snap_x: None,
            };
        }

        let distance = self.target_x - body.x;
        if distance.abs() <= params.stop_threshold && body.vx.abs() < params.stop_threshold {
            return MoveCommand {
                status: MoveStatus::Arrived,
                velocity_x: Some(0.0),
                snap_x: Some(self.target_x),
            };
        }

        match self.last_x {
            Some(last) if (body.x - last).abs() <= params.stuck_epsilon => {
                self.stalled_for += dt;
                if self.stalled_for > params.stuck_timeout {
                    return MoveCommand {
                        status: MoveStatus::Stuck,
                        velocity_x: Some(0.0),
                        snap_x: None,
                    };
                }
            }
            _ => {
                self.last_x = Some(body.x);
                self.stalled_for = 0.0;
            }
        }

        // Cap the speed so the stopping distance v²/(2·decel) never exceeds
        // what is left, and never cover more than the remaining distance.
        let direction = distance.signum();
        let braking_speed = (2.0 * params.deceleration * distance.abs()).sqrt();
        let desired = direction * params.max_speed.min(braking_speed);
        let rate = if body.vx != 0.0 && body.vx.signum() != direction {
            params.reverse_acceleration
        } else if desired.abs() > body.vx.abs() {
            params.acceleration
        } else {
            params.deceleration
        };
        let mut velocity = move_towards(body.vx, desired, rate * dt);
        if velocity.abs() * dt > distance.abs() {
            velocity = distance / dt;
        }

        MoveCommand {
            status: MoveStatus::Moving,
            velocity_x: Some(velocity),
            snap_x: None,
        }
    }

    /// Steps and applies the command to the host world.
    pub fn drive(
        &mut self,
        id: CustomerId,
        body: &BodyState,
        dt: f32,
        params: &MotionParams,
        world: &mut dyn FacilityWorld,
    ) -> MoveStatus {
        let held = world.is_externally_held(id);
        let command = self.step(body, held, dt, params);
        if let Some(vx) = command.velocity_x {
            world.set_velocity_x(id, vx);
        }
        if let Some(x) = command.snap_x {
            world.snap_x(id, x);
        }
        command.status
    }
}
