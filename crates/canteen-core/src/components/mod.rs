//! ECS Components
//!
//! Customer components and the resources shared by the facility's systems.

pub mod catalog;
pub mod clock;
pub mod controller;
pub mod customer;
pub mod desk;
pub mod stairs;
pub mod tuning;

pub use catalog::*;
pub use clock::*;
pub use controller::*;
pub use customer::*;
pub use desk::*;
pub use stairs::*;
pub use tuning::*;
