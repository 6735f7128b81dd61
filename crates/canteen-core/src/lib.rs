//! Canteen Simulation Engine Library
//!
//! Customers arrive, claim a desk, walk (and climb) to it, order, wait for
//! food, eat and leave. The engine owns the desk pool and every customer's
//! lifecycle; bodies, food and speech bubbles belong to a host world behind
//! the traits in [`world`].

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod events;
pub mod facility;
pub mod headless;
pub mod navigation;
pub mod output;
pub mod setup;
pub mod states;
pub mod systems;
pub mod world;

pub use components::*;

pub use config::{CanteenConfig, ConfigError, DEFAULT_CONFIG_PATH};
pub use events::{EventLog, EventLogger};
pub use facility::Facility;
pub use headless::HeadlessWorld;
pub use output::{write_snapshot, write_stats, FacilityStats};
pub use world::{
    Actuator, BodyMode, BodySensor, BodyState, FacilityWorld, Indicator, IndicatorKind,
    IndicatorSink, PresenceSensor, WorldPort,
};

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
