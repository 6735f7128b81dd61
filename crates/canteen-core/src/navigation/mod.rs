//! Navigation
//!
//! Moves customers around a multi-level facility: horizontal walks with an
//! acceleration model, one-level climbs at registered staircases, and routes
//! chaining the two.

pub mod horizontal;
pub mod route;
pub mod transfer;

pub use horizontal::{HorizontalMove, MoveCommand, MoveStatus};
pub use route::{Route, RouteStatus};
pub use transfer::{LevelStep, StepStatus};

use thiserror::Error;

use crate::config::{ClimbParams, MotionParams};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum NavigationError {
    #[error("no staircase registered above level {boundary}")]
    NoTransferPoint { boundary: i32 },
    #[error("levels {from} and {to} are not adjacent")]
    NotAdjacent { from: i32, to: i32 },
}

/// Movement parameters shared by every leg of a route.
#[derive(Debug, Clone, Copy)]
pub struct NavParams<'a> {
    pub motion: &'a MotionParams,
    pub climb: &'a ClimbParams,
    pub level_height: f32,
}

/// Moves `current` toward `target` by at most `max_delta`.
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + delta.signum() * max_delta
    }
}
