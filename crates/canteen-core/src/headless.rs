//! Headless World
//!
//! A minimal host for running the facility without a game engine: bodies
//! integrate their commanded velocity, dynamic bodies land on the floor of
//! the level they are on, and an optional kitchen serves whatever a waiting
//! customer's bubble asks for after a fixed delay.

use canteen_events::CustomerId;
use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::world::{
    level_of, Actuator, BodyMode, BodySensor, BodyState, Indicator, IndicatorKind, IndicatorSink,
    PresenceSensor,
};

/// How close food must be for a customer to reach it.
pub const REACH: f32 = 1.0;

#[derive(Debug, Clone)]
struct HeadlessBody {
    state: BodyState,
    mode: BodyMode,
    seated: bool,
    held: bool,
    blocked: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct Food {
    dish: String,
    x: f32,
    y: f32,
}

#[derive(Debug, Clone)]
struct Ticket {
    dish: String,
    remaining: f32,
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessWorld {
    level_height: f32,
    min_x: f32,
    max_x: f32,
    bodies: BTreeMap<CustomerId, HeadlessBody>,
    indicators: BTreeMap<CustomerId, Indicator>,
    food: Vec<Food>,
    serve_delay: Option<f32>,
    tickets: BTreeMap<CustomerId, Ticket>,
    served: u64,
}

impl HeadlessWorld {
    pub fn new(level_height: f32, min_x: f32, max_x: f32) -> Self {
        Self {
            level_height,
            min_x,
            max_x,
            ..Self::default()
        }
    }

    pub fn from_layout(layout: &LayoutConfig) -> Self {
        Self::new(layout.level_height, layout.bounds_min_x, layout.bounds_max_x)
    }

    /// Serves every order `delay` seconds after it is shown.
    pub fn with_kitchen(mut self, delay: f32) -> Self {
        self.serve_delay = Some(delay);
        self
    }

    /// Advances bodies and the kitchen by `dt` seconds.
    pub fn integrate(&mut self, dt: f32) {
        for body in self.bodies.values_mut() {
            if body.seated || body.held {
                continue;
            }
            if body.blocked {
                body.state.vx = 0.0;
            }
            body.state.x += body.state.vx * dt;
            if body.mode == BodyMode::Dynamic {
                body.state.y = level_of(body.state.y, self.level_height) as f32 * self.level_height;
            }
        }

        let mut ready = Vec::new();
        for (id, ticket) in self.tickets.iter_mut() {
            ticket.remaining -= dt;
            if ticket.remaining <= 0.0 {
                ready.push(*id);
            }
        }
        for id in ready {
            let Some(ticket) = self.tickets.remove(&id) else {
                continue;
            };
            if let Some(body) = self.bodies.get(&id) {
                self.food.push(Food {
                    dish: ticket.dish,
                    x: body.state.x,
                    y: body.state.y,
                });
                self.served += 1;
            }
        }
    }

    /// Puts a dish down at a spot, as a waiter would.
    pub fn place_food(&mut self, dish: impl Into<String>, x: f32, y: f32) {
        self.food.push(Food {
            dish: dish.into(),
            x,
            y,
        });
    }

    /// Makes a body ignore velocity commands, as if walled in.
    pub fn block(&mut self, id: CustomerId, blocked: bool) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.blocked = blocked;
        }
    }

    /// Picks a body up (or puts it down).
    pub fn hold(&mut self, id: CustomerId, held: bool) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.held = held;
        }
    }

    /// Moves a body directly, bypassing physics.
    pub fn teleport(&mut self, id: CustomerId, x: f32, y: f32) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.state.x = x;
            body.state.y = y;
        }
    }

    /// Drops a body without telling the engine.
    pub fn vanish(&mut self, id: CustomerId) -> bool {
        self.tickets.remove(&id);
        self.indicators.remove(&id);
        self.bodies.remove(&id).is_some()
    }

    pub fn body_mode(&self, id: CustomerId) -> Option<BodyMode> {
        self.bodies.get(&id).map(|b| b.mode)
    }

    pub fn is_seated(&self, id: CustomerId) -> bool {
        self.bodies.get(&id).map_or(false, |b| b.seated)
    }

    pub fn indicator(&self, id: CustomerId) -> Option<&Indicator> {
        self.indicators.get(&id)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn food_waiting(&self) -> usize {
        self.food.len()
    }

    /// Dishes the kitchen has delivered so far.
    pub fn served(&self) -> u64 {
        self.served
    }
}

impl BodySensor for HeadlessWorld {
    fn body(&self, id: CustomerId) -> Option<BodyState> {
        self.bodies.get(&id).map(|b| b.state)
    }
}

impl Actuator for HeadlessWorld {
    fn set_velocity_x(&mut self, id: CustomerId, vx: f32) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.state.vx = vx;
        }
    }

    fn shift_vertical(&mut self, id: CustomerId, dy: f32) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.state.y += dy;
        }
    }

    fn snap_x(&mut self, id: CustomerId, x: f32) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.state.x = x;
        }
    }

    fn set_body_mode(&mut self, id: CustomerId, mode: BodyMode) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.mode = mode;
        }
    }

    fn seat(&mut self, id: CustomerId, desk_x: f32, desk_y: f32) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.state = BodyState::new(desk_x, desk_y);
            body.seated = true;
        }
    }

    fn unseat(&mut self, id: CustomerId) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.seated = false;
        }
    }

    fn spawn_body(&mut self, id: CustomerId, x: f32, y: f32) {
        self.bodies.insert(
            id,
            HeadlessBody {
                state: BodyState::new(x, y),
                mode: BodyMode::Dynamic,
                seated: false,
                held: false,
                blocked: false,
            },
        );
    }

    fn despawn_body(&mut self, id: CustomerId) {
        self.vanish(id);
    }
}

impl PresenceSensor for HeadlessWorld {
    fn take_food_nearby(&mut self, id: CustomerId, dish: &str) -> bool {
        let Some(body) = self.bodies.get(&id) else {
            return false;
        };
        let level = level_of(body.state.y, self.level_height);
        let found = self.food.iter().position(|food| {
            food.dish == dish
                && level_of(food.y, self.level_height) == level
                && (food.x - body.state.x).abs() <= REACH
        });
        match found {
            Some(index) => {
                self.food.remove(index);
                true
            }
            None => false,
        }
    }

    fn is_inside_facility(&self, id: CustomerId) -> bool {
        self.bodies
            .get(&id)
            .map_or(false, |b| b.state.x >= self.min_x && b.state.x <= self.max_x)
    }

    fn is_externally_held(&self, id: CustomerId) -> bool {
        self.bodies.get(&id).map_or(false, |b| b.held)
    }
}

impl IndicatorSink for HeadlessWorld {
    fn show_indicator(&mut self, id: CustomerId, indicator: Indicator) {
        if let (Some(delay), IndicatorKind::Order, Some(dish)) =
            (self.serve_delay, indicator.kind, indicator.dish.as_ref())
        {
            if !self.tickets.contains_key(&id) {
                self.tickets.insert(
                    id,
                    Ticket {
                        dish: dish.clone(),
                        remaining: delay,
                    },
                );
            }
        }
        self.indicators.insert(id, indicator);
    }

    fn hide_indicator(&mut self, id: CustomerId) {
        self.tickets.remove(&id);
        self.indicators.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.1;

    #[test]
    fn test_dynamic_body_lands_on_floor() {
        let mut world = HeadlessWorld::new(3.0, 0.0, 10.0);
        let id = CustomerId(1);
        world.spawn_body(id, 1.0, 3.4);
        world.set_velocity_x(id, 2.0);
        world.integrate(DT);
        let body = world.body(id).unwrap();
        assert_eq!(body.y, 3.0);
        assert!((body.x - 1.2).abs() < 1e-5);
    }

    #[test]
    fn test_kinematic_body_keeps_height() {
        let mut world = HeadlessWorld::new(3.0, 0.0, 10.0);
        let id = CustomerId(1);
        world.spawn_body(id, 1.0, 0.0);
        world.set_body_mode(id, BodyMode::Kinematic);
        world.shift_vertical(id, 1.7);
        world.integrate(DT);
        assert_eq!(world.body(id).unwrap().y, 1.7);
    }

    #[test]
    fn test_seated_and_held_bodies_do_not_move() {
        let mut world = HeadlessWorld::new(3.0, 0.0, 10.0);
        world.spawn_body(CustomerId(1), 1.0, 0.0);
        world.spawn_body(CustomerId(2), 1.0, 0.0);
        world.seat(CustomerId(1), 4.0, 0.0);
        world.hold(CustomerId(2), true);
        world.set_velocity_x(CustomerId(1), 3.0);
        world.set_velocity_x(CustomerId(2), 3.0);
        world.integrate(DT);
        assert_eq!(world.body(CustomerId(1)).unwrap().x, 4.0);
        assert_eq!(world.body(CustomerId(2)).unwrap().x, 1.0);
        assert!(world.is_seated(CustomerId(1)));
        assert!(world.is_externally_held(CustomerId(2)));
    }

    #[test]
    fn test_food_must_match_and_be_in_reach() {
        let mut world = HeadlessWorld::new(3.0, 0.0, 10.0);
        let id = CustomerId(1);
        world.spawn_body(id, 2.0, 0.0);
        world.place_food("ramen", 5.0, 0.0);
        world.place_food("ramen", 2.0, 3.0);
        world.place_food("tea", 2.5, 0.0);
        assert!(!world.take_food_nearby(id, "ramen"));
        assert!(world.take_food_nearby(id, "tea"));
        assert!(!world.take_food_nearby(id, "tea"));
        assert_eq!(world.food_waiting(), 2);
    }

    #[test]
    fn test_kitchen_serves_after_delay() {
        let mut world = HeadlessWorld::new(3.0, 0.0, 10.0).with_kitchen(0.25);
        let id = CustomerId(1);
        world.spawn_body(id, 2.0, 0.0);
        for _ in 0..5 {
            world.show_indicator(id, Indicator::order("ramen", 0.0));
        }
        world.integrate(DT);
        world.integrate(DT);
        assert!(!world.take_food_nearby(id, "ramen"));
        world.integrate(DT);
        assert_eq!(world.served(), 1);
        assert!(world.take_food_nearby(id, "ramen"));
    }

    #[test]
    fn test_inside_facility() {
        let mut world = HeadlessWorld::new(3.0, 0.0, 10.0);
        let id = CustomerId(1);
        world.spawn_body(id, 0.5, 0.0);
        assert!(world.is_inside_facility(id));
        world.teleport(id, -0.5, 0.0);
        assert!(!world.is_inside_facility(id));
        assert!(world.vanish(id));
        assert!(!world.is_inside_facility(id));
        assert!(world.body(id).is_none());
    }
}
