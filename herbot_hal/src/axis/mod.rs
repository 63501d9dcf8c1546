//! Axis controllers.
//!
//! Three heterogeneous axes plus the gripper, each an exclusively owned
//! handle over one driver:
//!
//! | Controller | Actuator | Position source |
//! |------------|----------|-----------------|
//! | [`StepperAxis`] (Z) | stepper lift | step count, persisted |
//! | [`LinearAxis`] (R) | timed linear actuator | duration × speed, persisted |
//! | [`RotaryAxis`] (Θ) | DC base | none (logical reference only) |
//! | [`Gripper`] | servo cutter | last commanded angle |
//!
//! Every estimate is dead reckoning. Homing is what makes it trustworthy.
//!
//! Homing requirements are deliberately asymmetric: Z only warns when
//! asked for an absolute move while unhomed, R refuses.

mod gripper;
mod linear;
mod rotary;
mod stepper;

pub use gripper::Gripper;
pub use linear::LinearAxis;
pub use rotary::{ActiveDrive, RotaryAxis};
pub use stepper::StepperAxis;

use crate::driver::RigDrivers;
use herbot_common::axis::AxisId;
use herbot_common::config::RigConfig;
use herbot_common::state::StatePersistence;
use herbot_common::timing::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Axis command failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AxisError {
    /// Target outside physical travel.
    #[error("{axis} target {target} outside [0, {max}]")]
    OutOfRange { axis: AxisId, target: f64, max: f64 },

    /// Absolute motion requested before homing.
    #[error("{0} axis is not homed")]
    NotHomed(AxisId),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result of a command that may be skipped without failing.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum MoveOutcome {
    Completed,
    /// Nothing was driven and no state changed.
    Skipped(AxisError),
}

impl MoveOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Promote a skip to a hard failure.
    pub fn into_result(self) -> Result<(), AxisError> {
        match self {
            Self::Completed => Ok(()),
            Self::Skipped(reason) => Err(reason),
        }
    }
}

/// All four controllers of one rig.
pub struct RigAxes {
    pub z: StepperAxis,
    pub r: LinearAxis,
    pub theta: RotaryAxis,
    pub gripper: Gripper,
}

impl RigAxes {
    /// Bind each driver to its controller, loading persisted Z and R state
    /// from the configured state directory.
    pub fn build(
        config: &RigConfig,
        drivers: RigDrivers,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AxisError> {
        let RigDrivers {
            z,
            r,
            theta,
            gripper,
        } = drivers;

        let z = StepperAxis::new(
            z,
            config.z_axis.calibration,
            config.z_axis.homing_frequency_hz,
            StatePersistence::new(config.z_state_path()),
            Arc::clone(&clock),
        )?;
        let r = LinearAxis::new(
            r,
            config.r_axis.stroke_mm,
            StatePersistence::new(config.r_state_path()),
            Arc::clone(&clock),
        );
        let theta = RotaryAxis::new(theta, Arc::clone(&clock));
        let gripper = Gripper::new(gripper, &config.gripper, clock)?;

        Ok(Self {
            z,
            r,
            theta,
            gripper,
        })
    }

    /// Disable and release every driver. Idempotent.
    pub fn release(&mut self) {
        self.theta.release();
        self.r.release();
        self.z.release();
        self.gripper.release();
    }
}

pub(crate) fn require_positive_frequency(frequency_hz: f64) -> Result<(), AxisError> {
    if frequency_hz.is_finite() && frequency_hz > 0.0 {
        Ok(())
    } else {
        Err(AxisError::InvalidParameter(format!(
            "step frequency must be > 0 Hz (got {frequency_hz})"
        )))
    }
}
