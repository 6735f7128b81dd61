//! Stairs
//!
//! One transfer point per level boundary. Boundary `n` joins level `n` and
//! level `n + 1`.

use bevy_ecs::prelude::*;
use std::collections::BTreeMap;

/// Resource: horizontal position of the staircase for each boundary.
#[derive(Resource, Debug, Clone, Default)]
pub struct StairRegistry {
    points: BTreeMap<i32, f32>,
}

impl StairRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or moves) the staircase above `level`.
    pub fn register(&mut self, level: i32, x: f32) {
        self.points.insert(level, x);
    }

    pub fn remove(&mut self, level: i32) -> Option<f32> {
        self.points.remove(&level)
    }

    /// The boundary crossed when moving one level from `from` toward `to`.
    pub fn boundary(from: i32, to: i32) -> i32 {
        if to > from {
            from
        } else {
            from - 1
        }
    }

    pub fn transfer_x(&self, boundary: i32) -> Option<f32> {
        self.points.get(&boundary).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Resource: boundaries already reported as missing a staircase.
#[derive(Resource, Debug, Default)]
pub struct FaultLog {
    missing_stairs: std::collections::BTreeSet<i32>,
}

impl FaultLog {
    /// True the first time a boundary is reported.
    pub fn first_missing_stairs(&mut self, boundary: i32) -> bool {
        self.missing_stairs.insert(boundary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary() {
        assert_eq!(StairRegistry::boundary(0, 1), 0);
        assert_eq!(StairRegistry::boundary(2, 1), 1);
        assert_eq!(StairRegistry::boundary(1, 0), 0);
    }

    #[test]
    fn test_register_and_lookup() {
        let mut stairs = StairRegistry::new();
        stairs.register(0, 8.0);
        stairs.register(0, 9.0);
        assert_eq!(stairs.transfer_x(0), Some(9.0));
        assert_eq!(stairs.transfer_x(1), None);
        assert_eq!(stairs.remove(0), Some(9.0));
        assert!(stairs.is_empty());
    }

    #[test]
    fn test_fault_log_reports_once() {
        let mut faults = FaultLog::default();
        assert!(faults.first_missing_stairs(1));
        assert!(!faults.first_missing_stairs(1));
        assert!(faults.first_missing_stairs(2));
    }
}
