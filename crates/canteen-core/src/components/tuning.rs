//! Facility tuning shared by every customer.

use bevy_ecs::prelude::*;

use crate::config::{CanteenConfig, ClimbParams, CustomerProfile, LayoutConfig, MotionParams, WanderParams};
use crate::navigation::NavParams;

/// Resource: geometry and behaviour parameters taken from the configuration.
#[derive(Resource, Debug, Clone)]
pub struct FacilityTuning {
    pub layout: LayoutConfig,
    /// Profile given to newly admitted customers
    pub customer: CustomerProfile,
    pub motion: MotionParams,
    pub climb: ClimbParams,
    pub wander: WanderParams,
}

impl FacilityTuning {
    pub fn from_config(config: &CanteenConfig) -> Self {
        Self {
            layout: config.layout.clone(),
            customer: config.customer.clone(),
            motion: config.motion.clone(),
            climb: config.climb.clone(),
            wander: config.wander.clone(),
        }
    }

    pub fn nav(&self) -> NavParams<'_> {
        NavParams {
            motion: &self.motion,
            climb: &self.climb,
            level_height: self.layout.level_height,
        }
    }
}

impl Default for FacilityTuning {
    fn default() -> Self {
        Self::from_config(&CanteenConfig::default())
    }
}
