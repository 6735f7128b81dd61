//! Facility Controller
//!
//! Outcome counters and the pause flag. Each customer's outcome is counted
//! at most once, whichever path reports it.

use bevy_ecs::prelude::*;
use canteen_events::{CustomerId, OutcomeCounters};
use std::collections::HashSet;

/// What happens to customers already inside when the facility is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetPolicy {
    /// Customers stay and find out their desks are gone
    #[default]
    KeepCustomers,
    /// Customers are despawned along with their bodies
    RemoveCustomers,
}

/// Resource: outcome counters and run state.
#[derive(Resource, Debug, Default)]
pub struct FacilityController {
    outcomes: OutcomeCounters,
    reported: HashSet<CustomerId>,
    paused: bool,
}

impl FacilityController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if this customer already reported.
    pub fn report_success(&mut self, customer: CustomerId) -> bool {
        if !self.reported.insert(customer) {
            return false;
        }
        self.outcomes.successes += 1;
        true
    }

    /// Returns false if this customer already reported.
    pub fn report_failure(&mut self, customer: CustomerId) -> bool {
        if !self.reported.insert(customer) {
            return false;
        }
        self.outcomes.failures += 1;
        true
    }

    pub fn has_reported(&self, customer: CustomerId) -> bool {
        self.reported.contains(&customer)
    }

    pub fn outcomes(&self) -> OutcomeCounters {
        self.outcomes
    }

    /// Returns true if the facility was running.
    pub fn pause(&mut self) -> bool {
        !std::mem::replace(&mut self.paused, true)
    }

    /// Returns true if the facility was paused.
    pub fn resume(&mut self) -> bool {
        std::mem::replace(&mut self.paused, false)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn reset_counters(&mut self) {
        self.outcomes = OutcomeCounters::default();
        self.reported.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_once_per_customer() {
        let mut controller = FacilityController::new();
        assert!(controller.report_failure(CustomerId(1)));
        assert!(!controller.report_failure(CustomerId(1)));
        assert!(!controller.report_success(CustomerId(1)));
        assert!(controller.report_success(CustomerId(2)));

        let outcomes = controller.outcomes();
        assert_eq!(outcomes.successes, 1);
        assert_eq!(outcomes.failures, 1);
    }

    #[test]
    fn test_pause_resume() {
        let mut controller = FacilityController::new();
        assert!(controller.pause());
        assert!(!controller.pause());
        assert!(controller.is_paused());
        assert!(controller.resume());
        assert!(!controller.resume());
    }

    #[test]
    fn test_reset_counters() {
        let mut controller = FacilityController::new();
        controller.report_success(CustomerId(3));
        controller.reset_counters();
        assert_eq!(controller.outcomes().total(), 0);
        assert!(!controller.has_reported(CustomerId(3)));
    }
}
