//! Routes: climb level by level, then walk.

use canteen_events::CustomerId;

use super::{HorizontalMove, LevelStep, MoveStatus, NavParams, NavigationError, StepStatus};
use crate::components::StairRegistry;
use crate::world::{BodyState, FacilityWorld};

#[derive(Debug, Clone, PartialEq)]
pub enum RouteStatus {
    InProgress,
    /// Finished one level step; the caller may re-check its goal
    LevelChanged,
    Arrived,
    Stuck,
    Failed(NavigationError),
}

#[derive(Debug, Clone, PartialEq)]
enum Leg {
    Plan,
    Transfer(LevelStep),
    Walk(HorizontalMove),
}

/// Navigation to a point on some level.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    target_level: i32,
    target_x: f32,
    leg: Leg,
}

impl Route {
    pub fn new(target_level: i32, target_x: f32) -> Self {
        Self {
            target_level,
            target_x,
            leg: Leg::Plan,
        }
    }

    pub fn target_level(&self) -> i32 {
        self.target_level
    }

    pub fn target_x(&self) -> f32 {
        self.target_x
    }

    pub fn step(
        &mut self,
        id: CustomerId,
        body: &BodyState,
        dt: f32,
        stairs: &StairRegistry,
        params: &NavParams<'_>,
        world: &mut dyn FacilityWorld,
    ) -> RouteStatus {
        if self.leg == Leg::Plan {
            let level = body.level(params.level_height);
            self.leg = if level == self.target_level {
                Leg::Walk(HorizontalMove::new(self.target_x))
            } else {
                let next = if self.target_level > level { level + 1 } else { level - 1 };
                match LevelStep::begin(level, next, stairs) {
                    Ok(step) => Leg::Transfer(step),
                    Err(err) => return RouteStatus::Failed(err),
                }
            };
        }

        match &mut self.leg {
            Leg::Plan => RouteStatus::InProgress,
            Leg::Transfer(step) => match step.step(id, body, dt, params, world) {
                StepStatus::InProgress => RouteStatus::InProgress,
                StepStatus::Completed => {
                    self.leg = Leg::Plan;
                    RouteStatus::LevelChanged
                }
                StepStatus::Stuck => {
                    self.leg = Leg::Plan;
                    RouteStatus::Stuck
                }
            },
            Leg::Walk(walk) => match walk.drive(id, body, dt, params.motion, world) {
                MoveStatus::Moving => RouteStatus::InProgress,
                MoveStatus::Arrived => RouteStatus::Arrived,
                MoveStatus::Stuck => {
                    self.leg = Leg::Plan;
                    RouteStatus::Stuck
                }
            },
        }
    }

    /// Drops any in-flight leg, leaving the body still and dynamic.
    pub fn cancel(&mut self, id: CustomerId, world: &mut dyn FacilityWorld) {
        match &mut self.leg {
            Leg::Transfer(step) => step.cancel(id, world),
            Leg::Walk(_) => world.set_velocity_x(id, 0.0),
            Leg::Plan => {}
        }
        self.leg = Leg::Plan;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClimbParams, MotionParams};
    use crate::headless::HeadlessWorld;
    use crate::world::{Actuator, BodySensor};

    const DT: f32 = 1.0 / 60.0;

    fn run(stairs: &StairRegistry, route: &mut Route, world: &mut HeadlessWorld) -> (RouteStatus, Vec<RouteStatus>) {
        let motion = MotionParams::default();
        let climb = ClimbParams::default();
        let params = NavParams {
            motion: &motion,
            climb: &climb,
            level_height: 3.0,
        };
        let id = CustomerId(1);
        let mut seen = Vec::new();
        for _ in 0..3000 {
            let body = world.body(id).unwrap();
            let status = route.step(id, &body, DT, stairs, &params, world);
            world.integrate(DT);
            match status {
                RouteStatus::InProgress => {}
                RouteStatus::LevelChanged => seen.push(status),
                other => return (other, seen),
            }
        }
        (RouteStatus::InProgress, seen)
    }

    #[test]
    fn test_same_level_walk() {
        let stairs = StairRegistry::new();
        let mut world = HeadlessWorld::new(3.0, -10.0, 20.0);
        world.spawn_body(CustomerId(1), 0.0, 0.0);
        let mut route = Route::new(0, 5.0);
        let (status, seen) = run(&stairs, &mut route, &mut world);
        assert_eq!(status, RouteStatus::Arrived);
        assert!(seen.is_empty());
        assert_eq!(world.body(CustomerId(1)).unwrap().x, 5.0);
    }

    #[test]
    fn test_two_levels_up() {
        let mut stairs = StairRegistry::new();
        stairs.register(0, 8.0);
        stairs.register(1, 2.0);
        let mut world = HeadlessWorld::new(3.0, -10.0, 20.0);
        world.spawn_body(CustomerId(1), 0.5, 0.0);

        let mut route = Route::new(2, 4.0);
        let (status, seen) = run(&stairs, &mut route, &mut world);
        assert_eq!(status, RouteStatus::Arrived);
        assert_eq!(seen.len(), 2);
        let body = world.body(CustomerId(1)).unwrap();
        assert_eq!(body.level(3.0), 2);
        assert_eq!(body.x, 4.0);
    }

    #[test]
    fn test_missing_upper_staircase() {
        let mut stairs = StairRegistry::new();
        stairs.register(0, 3.0);
        let mut world = HeadlessWorld::new(3.0, -10.0, 20.0);
        world.spawn_body(CustomerId(1), 0.5, 0.0);

        let mut route = Route::new(2, 4.0);
        let (status, seen) = run(&stairs, &mut route, &mut world);
        assert_eq!(seen.len(), 1);
        assert_eq!(
            status,
            RouteStatus::Failed(NavigationError::NoTransferPoint { boundary: 1 })
        );
    }

    #[test]
    fn test_blocked_walk_is_stuck() {
        let stairs = StairRegistry::new();
        let mut world = HeadlessWorld::new(3.0, -10.0, 20.0);
        world.spawn_body(CustomerId(1), 0.0, 0.0);
        world.block(CustomerId(1), true);
        let mut route = Route::new(0, 5.0);
        let (status, _) = run(&stairs, &mut route, &mut world);
        assert_eq!(status, RouteStatus::Stuck);
    }
}
