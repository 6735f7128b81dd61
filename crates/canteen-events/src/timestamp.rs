//! Simulation Timestamp Types
//!
//! Simulation time is a monotonically increasing tick counter paired with the
//! elapsed logical seconds. Logical seconds only advance while the facility is
//! running, so a paused session keeps the same timestamp.
//!
//! # Example
//!
//! ```
//! use canteen_events::SimTimestamp;
//!
//! let ts = SimTimestamp::new(120, 2.0);
//! assert_eq!(ts.tick, 120);
//! assert_eq!(ts.to_string(), "tick_120@2.00s");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimTimestamp {
    /// Number of unpaused ticks run so far.
    pub tick: u64,
    /// Logical seconds elapsed since the session started.
    pub seconds: f64,
}

impl SimTimestamp {
    /// Creates a new SimTimestamp.
    pub fn new(tick: u64, seconds: f64) -> Self {
        Self { tick, seconds }
    }

    /// Creates a timestamp for the start of the simulation.
    pub fn start() -> Self {
        Self::default()
    }

    /// Advances by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.seconds += dt;
    }

    /// Seconds between `earlier` and this timestamp.
    pub fn seconds_since(&self, earlier: &SimTimestamp) -> f64 {
        self.seconds - earlier.seconds
    }
}

impl fmt::Display for SimTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick_{}@{:.2}s", self.tick, self.seconds)
    }
}
