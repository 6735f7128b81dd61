//! World Port
//!
//! The engine never touches physics, rendering or the kitchen directly. The
//! host implements the traits below and hands the implementation to the
//! facility, which keeps it in a [`WorldPort`] resource.

use bevy_ecs::prelude::*;
use canteen_events::CustomerId;

/// Physical state of a customer's body as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
}

impl BodyState {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, vx: 0.0 }
    }

    /// Level the body currently stands on.
    pub fn level(&self, level_height: f32) -> i32 {
        level_of(self.y, level_height)
    }
}

/// Maps a vertical position to a level index.
pub fn level_of(y: f32, level_height: f32) -> i32 {
    (y / level_height).floor() as i32
}

/// Whether the host's physics drives the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Gravity and collisions apply
    Dynamic,
    /// Moved only by explicit shifts (climbing)
    Kinematic,
}

/// What the bubble above a customer shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorKind {
    Thinking,
    Order,
    Eating,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    pub kind: IndicatorKind,
    pub dish: Option<String>,
    /// 0.0 (calm) to 1.0 (about to give up)
    pub urgency: f32,
    pub important: bool,
}

impl Indicator {
    pub fn thinking() -> Self {
        Self {
            kind: IndicatorKind::Thinking,
            dish: None,
            urgency: 0.0,
            important: false,
        }
    }

    pub fn eating() -> Self {
        Self {
            kind: IndicatorKind::Eating,
            dish: None,
            urgency: 0.0,
            important: false,
        }
    }

    pub fn order(dish: impl Into<String>, urgency: f32) -> Self {
        Self {
            kind: IndicatorKind::Order,
            dish: Some(dish.into()),
            urgency: urgency.clamp(0.0, 1.0),
            important: true,
        }
    }
}

pub trait BodySensor {
    /// `None` means the body is gone and the customer is treated as removed.
    fn body(&self, id: CustomerId) -> Option<BodyState>;
}

pub trait Actuator {
    fn set_velocity_x(&mut self, id: CustomerId, vx: f32);
    fn shift_vertical(&mut self, id: CustomerId, dy: f32);
    fn snap_x(&mut self, id: CustomerId, x: f32);
    fn set_body_mode(&mut self, id: CustomerId, mode: BodyMode);
    fn seat(&mut self, id: CustomerId, desk_x: f32, desk_y: f32);
    fn unseat(&mut self, id: CustomerId);
    fn spawn_body(&mut self, id: CustomerId, x: f32, y: f32);
    fn despawn_body(&mut self, id: CustomerId);
}

pub trait PresenceSensor {
    /// Consumes matching food near the customer and returns whether any was found.
    fn take_food_nearby(&mut self, id: CustomerId, dish: &str) -> bool;
    fn is_inside_facility(&self, id: CustomerId) -> bool;
    fn is_externally_held(&self, id: CustomerId) -> bool;
}

pub trait IndicatorSink {
    fn show_indicator(&mut self, id: CustomerId, indicator: Indicator);
    fn hide_indicator(&mut self, id: CustomerId);
}

/// Everything the engine needs from its host.
pub trait FacilityWorld:
    BodySensor + Actuator + PresenceSensor + IndicatorSink + Send + Sync + 'static
{
}

impl<T> FacilityWorld for T where
    T: BodySensor + Actuator + PresenceSensor + IndicatorSink + Send + Sync + 'static
{
}

/// Resource: the host world, owned by the ECS world.
#[derive(Resource)]
pub struct WorldPort<W>(pub W);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_of() {
        assert_eq!(level_of(0.0, 3.0), 0);
        assert_eq!(level_of(2.99, 3.0), 0);
        assert_eq!(level_of(3.0, 3.0), 1);
        assert_eq!(level_of(6.4, 3.0), 2);
        assert_eq!(level_of(-0.1, 3.0), -1);
    }

    #[test]
    fn test_order_indicator_clamps_urgency() {
        let indicator = Indicator::order("ramen", 1.7);
        assert_eq!(indicator.urgency, 1.0);
        assert!(indicator.important);
        assert_eq!(indicator.dish.as_deref(), Some("ramen"));
        assert!(!Indicator::thinking().important);
    }
}
