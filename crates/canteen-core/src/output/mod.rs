//! Output Generation
//!
//! Snapshots and statistics.

pub mod snapshot;
pub mod stats;

pub use snapshot::*;
pub use stats::*;
