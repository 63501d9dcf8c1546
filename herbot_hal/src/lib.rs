//! # Herbot HAL
//!
//! Logical actuator drivers and the four axis controllers built on them.
//!
//! # Module Structure
//!
//! - [`driver`] - Driver traits (`StepDriver`, `HBridgeDriver`, `ServoDriver`) and `HalError`
//! - [`driver_registry`] - Named driver factories
//! - [`drivers`] - Driver implementations (`simulation`)
//! - [`axis`] - Z, R, Θ and gripper controllers
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         herbot_hal                          │
//! │  ┌────────────────┐   ┌──────────────┐   ┌───────────────┐  │
//! │  │ DriverRegistry │──►│  RigDrivers  │──►│    RigAxes    │  │
//! │  │ ("simulation") │   │ step, hbridge│   │ Z  R  Θ  grip │  │
//! │  └────────────────┘   │ servo        │   └───────┬───────┘  │
//! │                       └──────────────┘           │          │
//! │                                      Clock ◄─────┘          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod axis;
pub mod driver;
pub mod driver_registry;
pub mod drivers;

pub use crate::axis::{AxisError, MoveOutcome, RigAxes};
pub use crate::driver::{HalError, RigDrivers};
pub use crate::driver_registry::DriverRegistry;
