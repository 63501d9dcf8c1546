//! Servo cutting gripper.

use super::AxisError;
use crate::driver::ServoDriver;
use herbot_common::config::GripperConfig;
use herbot_common::consts::{CUT_OPEN_HOLD_S, SERVO_MAX_DEG};
use herbot_common::timing::{Clock, seconds};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// PWM duty [%] for a servo angle: 2.5 % at 0°, 12.5 % at 180°.
pub fn duty_for_angle(angle_deg: f64) -> f64 {
    2.5 + angle_deg / SERVO_MAX_DEG * 10.0
}

pub struct Gripper {
    driver: Box<dyn ServoDriver>,
    clock: Arc<dyn Clock>,
    open_deg: f64,
    close_deg: f64,
    hold: Duration,
    current_angle: Option<f64>,
}

impl Gripper {
    /// # Errors
    /// `InvalidParameter` if either calibrated angle is outside the servo
    /// range.
    pub fn new(
        driver: Box<dyn ServoDriver>,
        config: &GripperConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AxisError> {
        check_angle(config.open_deg)?;
        check_angle(config.close_deg)?;
        Ok(Self {
            driver,
            clock,
            open_deg: config.open_deg,
            close_deg: config.close_deg,
            hold: seconds(config.hold_s),
            current_angle: None,
        })
    }

    /// Drive to `angle_deg`, hold, then stop pulsing.
    pub fn set_angle(&mut self, angle_deg: f64, hold: Duration) -> Result<(), AxisError> {
        check_angle(angle_deg)?;
        self.drive_to(angle_deg, hold);
        Ok(())
    }

    pub fn open(&mut self, hold: Duration) {
        debug!("Gripper open");
        self.drive_to(self.open_deg, hold);
    }

    pub fn close(&mut self, hold: Duration) {
        debug!("Gripper close");
        self.drive_to(self.close_deg, hold);
    }

    /// Force open briefly, then close and hold for `cut_time`. The blade
    /// always starts its stroke from the open position.
    pub fn cut(&mut self, cut_time: Duration) {
        info!("Cutting ({:.1} s)", cut_time.as_secs_f64());
        self.drive_to(self.open_deg, seconds(CUT_OPEN_HOLD_S));
        self.drive_to(self.close_deg, cut_time);
    }

    /// Configured hold for plain open/close commands.
    pub fn default_hold(&self) -> Duration {
        self.hold
    }

    /// Last commanded angle; `None` before the first command.
    pub fn current_angle(&self) -> Option<f64> {
        self.current_angle
    }

    pub fn is_open(&self) -> bool {
        self.current_angle == Some(self.open_deg)
    }

    pub fn release(&mut self) {
        self.driver.release();
    }

    fn drive_to(&mut self, angle_deg: f64, hold: Duration) {
        self.driver.set_duty(duty_for_angle(angle_deg));
        self.clock.sleep(hold);
        self.driver.release();
        self.current_angle = Some(angle_deg);
    }
}

fn check_angle(angle_deg: f64) -> Result<(), AxisError> {
    if (0.0..=SERVO_MAX_DEG).contains(&angle_deg) {
        Ok(())
    } else {
        Err(AxisError::InvalidParameter(format!(
            "servo angle must be within [0, {SERVO_MAX_DEG}]° (got {angle_deg})"
        )))
    }
}
