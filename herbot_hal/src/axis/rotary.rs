//! Θ axis: DC motor under the pot.
//!
//! No angle is ever derived from rotation time. `home` records a nominal
//! zero that is only true at the instant of homing; it is not a live
//! readout. The continuous drive is the one non-blocking command on the rig.

use super::AxisError;
use crate::driver::{HBridgeDriver, Polarity};
use herbot_common::axis::Rotation;
use herbot_common::timing::Clock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// The continuous drive currently commanded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveDrive {
    pub rotation: Rotation,
    pub speed_percent: u8,
}

pub struct RotaryAxis {
    driver: Box<dyn HBridgeDriver>,
    clock: Arc<dyn Clock>,
    reference_angle_deg: f64,
    is_homed: bool,
    active: Option<ActiveDrive>,
    released: bool,
}

impl RotaryAxis {
    pub fn new(mut driver: Box<dyn HBridgeDriver>, clock: Arc<dyn Clock>) -> Self {
        driver.set_standby(true);
        Self {
            driver,
            clock,
            reference_angle_deg: 0.0,
            is_homed: false,
            active: None,
            released: false,
        }
    }

    /// Blocking timed rotation. Ends stopped.
    pub fn rotate(
        &mut self,
        rotation: Rotation,
        duration: Duration,
        speed_percent: u8,
    ) -> Result<(), AxisError> {
        check_speed(speed_percent)?;
        debug!(
            "θ {} {:.2} s @ {speed_percent}%",
            rotation.label(),
            duration.as_secs_f64()
        );
        self.apply(rotation, speed_percent);
        self.clock.sleep(duration);
        self.stop();
        Ok(())
    }

    /// Start turning and return immediately.
    pub fn start_continuous(
        &mut self,
        rotation: Rotation,
        speed_percent: u8,
    ) -> Result<(), AxisError> {
        check_speed(speed_percent)?;
        info!("θ continuous {} @ {speed_percent}%", rotation.label());
        self.apply(rotation, speed_percent);
        self.active = Some(ActiveDrive {
            rotation,
            speed_percent,
        });
        Ok(())
    }

    pub fn stop(&mut self) {
        self.driver.stop();
        if self.active.take().is_some() {
            debug!("θ stopped");
        }
    }

    /// Logical reset. Nothing moves.
    pub fn home(&mut self) {
        self.reference_angle_deg = 0.0;
        self.is_homed = true;
        info!("θ reference set to 0°");
    }

    /// Slow blocking rotation used to look the plant over.
    pub fn scan_rotate(
        &mut self,
        duration: Duration,
        rotation: Rotation,
        speed_percent: u8,
    ) -> Result<(), AxisError> {
        info!(
            "θ scan rotation {} for {:.0} s @ {speed_percent}%",
            rotation.label(),
            duration.as_secs_f64()
        );
        self.rotate(rotation, duration, speed_percent)
    }

    /// Last continuous drive commanded, if still running.
    pub fn active_drive(&self) -> Option<ActiveDrive> {
        self.active
    }

    /// Angle recorded by the last `home`. Not updated by rotation.
    pub fn reference_angle_deg(&self) -> f64 {
        self.reference_angle_deg
    }

    pub fn is_homed(&self) -> bool {
        self.is_homed
    }

    /// Stop, lower standby and release the lines. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.stop();
        self.driver.set_standby(false);
        self.driver.release();
        self.released = true;
        debug!("θ driver released");
    }

    fn apply(&mut self, rotation: Rotation, speed_percent: u8) {
        let polarity = match rotation {
            Rotation::Clockwise => Polarity::Forward,
            Rotation::CounterClockwise => Polarity::Reverse,
        };
        self.driver.drive(polarity, f64::from(speed_percent));
    }
}

fn check_speed(speed_percent: u8) -> Result<(), AxisError> {
    if speed_percent > 100 {
        return Err(AxisError::InvalidParameter(format!(
            "θ speed must be within 0..=100 % (got {speed_percent})"
        )));
    }
    Ok(())
}
