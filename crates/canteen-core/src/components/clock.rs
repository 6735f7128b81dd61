//! Clocks
//!
//! All timing runs on the logical clock, which only advances in unpaused
//! steps. Nothing here reads wall time.

use bevy_ecs::prelude::*;
use canteen_events::SimTimestamp;

/// Resource: the facility's logical clock.
#[derive(Resource, Debug, Clone, Default)]
pub struct SimClock {
    now: SimTimestamp,
    dt: f32,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, dt: f32) {
        self.dt = dt;
        self.now.advance(dt as f64);
    }

    pub fn now(&self) -> SimTimestamp {
        self.now
    }

    /// Length of the current tick in seconds.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn tick(&self) -> u64 {
        self.now.tick
    }

    pub fn elapsed(&self) -> f64 {
        self.now.seconds
    }
}

/// Resource: optional countdown for the whole session.
#[derive(Resource, Debug, Clone, Default)]
pub struct SessionTimer {
    remaining: Option<f32>,
    ended: bool,
}

impl SessionTimer {
    pub fn new(length: Option<f32>) -> Self {
        Self {
            remaining: length,
            ended: false,
        }
    }

    /// Counts down. Returns true only on the tick the session ends.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.ended {
            return false;
        }
        match self.remaining.as_mut() {
            Some(remaining) => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    *remaining = 0.0;
                    self.ended = true;
                    return true;
                }
                false
            }
            None => false,
        }
    }

    pub fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }
}

/// Per-customer wait accumulators, reset when the owning state is entered.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LifecycleClock {
    waiting_for_desk: f32,
    waiting_for_food: f32,
}

impl LifecycleClock {
    pub fn reset_desk_wait(&mut self) {
        self.waiting_for_desk = 0.0;
    }

    pub fn reset_food_wait(&mut self) {
        self.waiting_for_food = 0.0;
    }

    pub fn advance_desk_wait(&mut self, dt: f32) -> f32 {
        self.waiting_for_desk += dt;
        self.waiting_for_desk
    }

    pub fn advance_food_wait(&mut self, dt: f32) -> f32 {
        self.waiting_for_food += dt;
        self.waiting_for_food
    }

    pub fn waiting_for_desk(&self) -> f32 {
        self.waiting_for_desk
    }

    pub fn waiting_for_food(&self) -> f32 {
        self.waiting_for_food
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_clock_advance() {
        let mut clock = SimClock::new();
        clock.advance(0.5);
        clock.advance(0.5);
        assert_eq!(clock.tick(), 2);
        assert_eq!(clock.dt(), 0.5);
        assert!((clock.elapsed() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_session_ends_once() {
        let mut timer = SessionTimer::new(Some(1.0));
        assert!(!timer.advance(0.6));
        assert!(timer.advance(0.6));
        assert!(timer.has_ended());
        assert!(!timer.advance(0.6));
        assert_eq!(timer.remaining(), Some(0.0));
    }

    #[test]
    fn test_open_ended_session() {
        let mut timer = SessionTimer::new(None);
        for _ in 0..100 {
            assert!(!timer.advance(10.0));
        }
        assert!(!timer.has_ended());
    }

    #[test]
    fn test_lifecycle_clock_monotonic_and_reset() {
        let mut clock = LifecycleClock::default();
        let mut last = clock.waiting_for_food();
        for _ in 0..10 {
            let now = clock.advance_food_wait(0.1);
            assert!(now > last);
            last = now;
        }
        assert_eq!(clock.waiting_for_desk(), 0.0);
        clock.reset_food_wait();
        assert_eq!(clock.waiting_for_food(), 0.0);
    }
}
