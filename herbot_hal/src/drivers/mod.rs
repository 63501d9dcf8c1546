//! Driver implementations.
//!
//! - [`simulation`] - In-memory lines with inspectable probes, for bench
//!   runs and tests without hardware
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement `StepDriver`, `HBridgeDriver` and `ServoDriver`
//! 3. Expose a `DriverFactory` and register it in
//!    `DriverRegistry::with_builtin()`

pub mod simulation;
