//! Facility Setup
//!
//! Turns a configuration into the resources a facility starts with.

pub mod layout;

pub use layout::*;
