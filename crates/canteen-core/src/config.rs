//! Configuration
//!
//! Facility layout and tuning, loaded from a TOML file. Every section falls
//! back to its defaults, so a file only needs the values it changes.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "canteen.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete facility configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanteenConfig {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub customer: CustomerProfile,
    #[serde(default)]
    pub motion: MotionParams,
    #[serde(default)]
    pub climb: ClimbParams,
    #[serde(default)]
    pub wander: WanderParams,
    #[serde(default)]
    pub arrivals: ArrivalConfig,
    #[serde(default = "default_desks")]
    pub desks: Vec<DeskSpec>,
    #[serde(default = "default_stairs")]
    pub stairs: Vec<StairSpec>,
    #[serde(default = "default_orders")]
    pub orders: Vec<DishSpec>,
}

impl Default for CanteenConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            customer: CustomerProfile::default(),
            motion: MotionParams::default(),
            climb: ClimbParams::default(),
            wander: WanderParams::default(),
            arrivals: ArrivalConfig::default(),
            desks: default_desks(),
            stairs: default_stairs(),
            orders: default_orders(),
        }
    }
}

impl CanteenConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{} must be positive, got {}", name, value)))
            }
        }
        fn non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{} must not be negative, got {}", name, value)))
            }
        }

        positive("layout.level_height", self.layout.level_height)?;
        if self.layout.bounds_min_x >= self.layout.bounds_max_x {
            return Err(ConfigError::Invalid(
                "layout.bounds_min_x must be below layout.bounds_max_x".into(),
            ));
        }

        positive("motion.max_speed", self.motion.max_speed)?;
        positive("motion.acceleration", self.motion.acceleration)?;
        positive("motion.deceleration", self.motion.deceleration)?;
        positive("motion.reverse_acceleration", self.motion.reverse_acceleration)?;
        positive("motion.stop_threshold", self.motion.stop_threshold)?;
        positive("motion.stuck_timeout", self.motion.stuck_timeout)?;
        non_negative("motion.stuck_epsilon", self.motion.stuck_epsilon)?;

        positive("climb.speed", self.climb.speed)?;
        non_negative("climb.offset", self.climb.offset)?;
        non_negative("climb.mount_pause", self.climb.mount_pause)?;
        non_negative("climb.dismount_pause", self.climb.dismount_pause)?;

        non_negative("customer.order_time", self.customer.order_time)?;
        non_negative("customer.eating_time", self.customer.eating_time)?;
        positive("customer.max_wait_for_food", self.customer.max_wait_for_food)?;
        if let Some(limit) = self.customer.max_wait_for_desk {
            positive("customer.max_wait_for_desk", limit)?;
        }
        if self.customer.orders_required == 0 {
            return Err(ConfigError::Invalid("customer.orders_required must be at least 1".into()));
        }
        positive("customer.seat_tolerance", self.customer.seat_tolerance)?;
        positive("customer.replan_distance", self.customer.replan_distance)?;

        if self.wander.min_x > self.wander.max_x {
            return Err(ConfigError::Invalid("wander.min_x must not exceed wander.max_x".into()));
        }
        non_negative("wander.min_rest", self.wander.min_rest)?;
        if self.wander.min_rest > self.wander.max_rest {
            return Err(ConfigError::Invalid("wander.min_rest must not exceed wander.max_rest".into()));
        }

        if self.arrivals.queue_capacity == 0 {
            return Err(ConfigError::Invalid("arrivals.queue_capacity must be at least 1".into()));
        }
        non_negative("arrivals.admit_interval", self.arrivals.admit_interval)?;
        if let Some(length) = self.arrivals.session_length {
            positive("arrivals.session_length", length)?;
        }
        for rule in &self.arrivals.rules {
            non_negative("arrivals.rules.time", rule.time)?;
            non_negative("arrivals.rules.jitter", rule.jitter)?;
        }

        let mut boundaries = HashSet::new();
        for stair in &self.stairs {
            if !boundaries.insert(stair.level) {
                return Err(ConfigError::Invalid(format!(
                    "more than one staircase above level {}",
                    stair.level
                )));
            }
        }

        for dish in &self.orders {
            non_negative(&format!("orders.{}.weight", dish.name), dish.weight)?;
        }

        Ok(())
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Facility geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Height of one level; a body at `y` stands on level `floor(y / level_height)`
    pub level_height: f32,
    /// Where admitted customers appear
    pub entrance_x: f32,
    /// Where leaving customers walk to on level 0
    pub exit_x: f32,
    /// Horizontal extent of the facility
    pub bounds_min_x: f32,
    pub bounds_max_x: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            level_height: 3.0,
            entrance_x: 0.0,
            exit_x: -8.0,
            bounds_min_x: -6.0,
            bounds_max_x: 12.0,
        }
    }
}

/// Per-customer timing and tolerances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerProfile {
    /// Seconds spent choosing before an order is placed
    pub order_time: f32,
    /// Seconds spent eating one dish
    pub eating_time: f32,
    pub max_wait_for_food: f32,
    /// Give up looking for a desk after this long; never when unset
    pub max_wait_for_desk: Option<f32>,
    /// Dishes to finish before leaving satisfied
    pub orders_required: u32,
    /// How far from its desk a customer may stand and still sit down
    pub seat_tolerance: f32,
    /// A desk moved farther than this triggers a new route
    pub replan_distance: f32,
}

impl Default for CustomerProfile {
    fn default() -> Self {
        Self {
            order_time: 10.0,
            eating_time: 30.0,
            max_wait_for_food: 30.0,
            max_wait_for_desk: None,
            orders_required: 1,
            seat_tolerance: 0.5,
            replan_distance: 0.5,
        }
    }
}

/// Horizontal movement model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionParams {
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    /// Used instead of `acceleration` while moving away from the target
    pub reverse_acceleration: f32,
    pub stop_threshold: f32,
    /// Seconds without progress before a move gives up
    pub stuck_timeout: f32,
    /// Position change that still counts as no progress
    pub stuck_epsilon: f32,
    /// Stalls tolerated on the way to a desk before it is abandoned
    pub stuck_retries: u32,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            max_speed: 3.0,
            acceleration: 10.0,
            deceleration: 15.0,
            reverse_acceleration: 20.0,
            stop_threshold: 0.01,
            stuck_timeout: 0.5,
            stuck_epsilon: 0.001,
            stuck_retries: 1,
        }
    }
}

/// Vertical transfer between levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimbParams {
    pub speed: f32,
    /// How far past the destination floor the body travels before landing
    pub offset: f32,
    pub mount_pause: f32,
    pub dismount_pause: f32,
}

impl Default for ClimbParams {
    fn default() -> Self {
        Self {
            speed: 10.0,
            offset: 0.5,
            mount_pause: 0.3,
            dismount_pause: 0.3,
        }
    }
}

/// Idle walking while no desk is free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderParams {
    pub min_x: f32,
    pub max_x: f32,
    pub min_rest: f32,
    pub max_rest: f32,
}

impl Default for WanderParams {
    fn default() -> Self {
        Self {
            min_x: -5.0,
            max_x: 5.0,
            min_rest: 1.0,
            max_rest: 3.0,
        }
    }
}

/// Arrival queue and spawn schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrivalConfig {
    pub queue_capacity: usize,
    /// Seconds between admissions from the queue
    pub admit_interval: f32,
    /// Session countdown in seconds; open-ended when unset
    pub session_length: Option<f32>,
    pub rules: Vec<SpawnRule>,
}

impl Default for ArrivalConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 6,
            admit_interval: 1.0,
            session_length: None,
            rules: Vec::new(),
        }
    }
}

/// `count` arrivals around `time` seconds into the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRule {
    pub time: f32,
    #[serde(default)]
    pub jitter: f32,
    #[serde(default = "default_rule_count")]
    pub count: u32,
}

fn default_rule_count() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeskSpec {
    pub x: f32,
    pub y: f32,
}

/// Staircase joining `level` and `level + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StairSpec {
    pub level: i32,
    pub x: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishSpec {
    pub name: String,
    pub weight: f32,
}

fn default_desks() -> Vec<DeskSpec> {
    vec![
        DeskSpec { x: 3.0, y: 0.0 },
        DeskSpec { x: 5.0, y: 0.0 },
        DeskSpec { x: 3.0, y: 3.0 },
        DeskSpec { x: 6.0, y: 3.0 },
    ]
}

fn default_stairs() -> Vec<StairSpec> {
    vec![StairSpec { level: 0, x: 9.0 }]
}

fn default_orders() -> Vec<DishSpec> {
    vec![
        DishSpec { name: "ramen".into(), weight: 3.0 },
        DishSpec { name: "fresh-fish".into(), weight: 2.0 },
        DishSpec { name: "rice-ball".into(), weight: 1.0 },
    ]
}
