//! Actuator driver traits and error types.
//!
//! The rig has three kinds of actuator electronics, each reduced to its
//! logical intent:
//!
//! | Trait | Hardware | Intent |
//! |-------|----------|--------|
//! | [`StepDriver`] | step/direction stepper driver | enable, direction, step level |
//! | [`HBridgeDriver`] | dual H-bridge channel | polarity + duty, standby |
//! | [`ServoDriver`] | hobby servo on a PWM line | duty, release |
//!
//! Every command is assumed to succeed; there is no read-back. Timing
//! (pulse width, drive duration) is owned by the axis controllers, not by
//! the drivers.

use herbot_common::config::RigConfig;
use thiserror::Error;

/// Error types for driver setup.
#[derive(Debug, Clone, Error)]
pub enum HalError {
    /// Driver initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Driver not found
    #[error("Driver not found: {0}")]
    DriverNotFound(String),
}

/// Logical level on the stepper direction line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    /// Carriage moves up (step count increases).
    Up,
    /// Carriage moves down (step count decreases).
    Down,
}

/// H-bridge output polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Forward,
    Reverse,
}

/// Step/direction stepper driver.
pub trait StepDriver: Send {
    /// Energize (`true`) or free (`false`) the motor coils.
    fn enable(&mut self, on: bool);

    fn set_direction(&mut self, direction: StepDirection);

    /// Drive the step line. A rising edge advances the motor one step.
    fn set_step(&mut self, high: bool);

    /// Return every line to its idle state.
    fn release(&mut self);
}

/// One channel of an H-bridge motor driver.
pub trait HBridgeDriver: Send {
    /// Apply `duty_percent` (0-100) with the given polarity.
    fn drive(&mut self, polarity: Polarity, duty_percent: f64);

    /// Zero duty, both inputs low.
    fn stop(&mut self);

    /// Raise (`true`) or lower the bridge's standby line.
    fn set_standby(&mut self, active: bool);

    fn release(&mut self);
}

/// PWM-positioned servo.
pub trait ServoDriver: Send {
    /// Pulse duty in percent of the PWM period.
    fn set_duty(&mut self, duty_percent: f64);

    /// Stop pulsing so the servo holds without jitter.
    fn release(&mut self);
}

/// One driver handle per actuator, exclusively owned.
pub struct RigDrivers {
    pub z: Box<dyn StepDriver>,
    pub r: Box<dyn HBridgeDriver>,
    pub theta: Box<dyn HBridgeDriver>,
    pub gripper: Box<dyn ServoDriver>,
}

impl std::fmt::Debug for RigDrivers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RigDrivers").finish_non_exhaustive()
    }
}

/// Factory function type for opening a driver set.
pub type DriverFactory = fn(&RigConfig) -> Result<RigDrivers, HalError>;
