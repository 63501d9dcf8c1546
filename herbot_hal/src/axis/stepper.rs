//! Z axis: belt-driven stepper lift.
//!
//! Position is the signed count of step pulses issued since the last home,
//! persisted in steps after every command.

use super::{AxisError, MoveOutcome, require_positive_frequency};
use crate::driver::{StepDirection, StepDriver};
use herbot_common::axis::AxisId;
use herbot_common::config::Calibration;
use herbot_common::state::{AxisPosition, StatePersistence};
use herbot_common::timing::Clock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct StepperAxis {
    driver: Box<dyn StepDriver>,
    clock: Arc<dyn Clock>,
    calibration: Calibration,
    homing_half_period: Duration,
    current_step: i64,
    is_homed: bool,
    store: StatePersistence,
    released: bool,
}

impl StepperAxis {
    /// Bind the driver and restore the persisted step count.
    ///
    /// # Errors
    /// `InvalidParameter` if the calibration or homing frequency is not
    /// strictly positive.
    pub fn new(
        driver: Box<dyn StepDriver>,
        calibration: Calibration,
        homing_frequency_hz: f64,
        store: StatePersistence,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AxisError> {
        if !(calibration.steps_per_mm.is_finite() && calibration.steps_per_mm > 0.0)
            || !(calibration.max_position_mm.is_finite() && calibration.max_position_mm > 0.0)
        {
            return Err(AxisError::InvalidParameter(format!(
                "Z calibration must be positive (steps_per_mm={}, max_position_mm={})",
                calibration.steps_per_mm, calibration.max_position_mm
            )));
        }
        require_positive_frequency(homing_frequency_hz)?;

        let record = store.load_or_default();
        let current_step = record.position.round() as i64;
        let restored_mm = current_step as f64 / calibration.steps_per_mm;
        let in_travel = (0.0..=calibration.max_position_mm).contains(&restored_mm);
        if !in_travel {
            warn!(
                "Restored Z position {restored_mm:.1} mm from {} is outside 0..={} mm; Z not homed",
                store.path().display(),
                calibration.max_position_mm
            );
        }
        let axis = Self {
            driver,
            clock,
            calibration,
            homing_half_period: half_period(homing_frequency_hz),
            current_step,
            is_homed: record.is_homed && in_travel,
            store,
            released: false,
        };
        info!(
            "Z axis ready: {:.1} mm ({} steps), homed={}",
            axis.position_mm(),
            axis.current_step,
            axis.is_homed
        );
        Ok(axis)
    }

    /// Emit `steps` pulses at `frequency_hz`; the sign picks the direction.
    /// Persists afterwards even when `steps` is zero.
    pub fn move_by(&mut self, steps: i64, frequency_hz: f64) -> Result<(), AxisError> {
        require_positive_frequency(frequency_hz)?;
        self.pulse(steps, half_period(frequency_hz));
        self.persist();
        Ok(())
    }

    /// Move to `z_mm` above the bottom end.
    ///
    /// Unhomed: warns and moves anyway. Outside `[0, max_position_mm]`:
    /// logs, does nothing and returns [`MoveOutcome::Skipped`].
    pub fn move_to_absolute(
        &mut self,
        z_mm: f64,
        frequency_hz: f64,
    ) -> Result<MoveOutcome, AxisError> {
        require_positive_frequency(frequency_hz)?;
        if !self.is_homed {
            warn!("Z axis not homed; moving to {z_mm} mm on an untrusted position");
        }

        let max = self.calibration.max_position_mm;
        if !(0.0..=max).contains(&z_mm) {
            error!("Z target {z_mm} mm outside [0, {max}] mm; move skipped");
            return Ok(MoveOutcome::Skipped(AxisError::OutOfRange {
                axis: AxisId::Z,
                target: z_mm,
                max,
            }));
        }

        let steps = self.steps_to(z_mm);
        debug!(
            "Z {:.1} mm -> {z_mm} mm ({steps:+} steps @ {frequency_hz} Hz)",
            self.position_mm()
        );
        self.move_by(steps, frequency_hz)?;
        Ok(MoveOutcome::Completed)
    }

    /// Drive back to step 0 at the homing frequency and trust it.
    pub fn home(&mut self) {
        info!("Homing Z from step {}", self.current_step);
        self.pulse(-self.current_step, self.homing_half_period);
        self.current_step = 0;
        self.is_homed = true;
        self.persist();
        info!("Z homed");
    }

    pub fn position_mm(&self) -> f64 {
        self.current_step as f64 / self.calibration.steps_per_mm
    }

    pub fn current_step(&self) -> i64 {
        self.current_step
    }

    pub fn is_homed(&self) -> bool {
        self.is_homed
    }

    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// Disable the coils and release the lines. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.driver.enable(false);
        self.driver.release();
        self.released = true;
        debug!("Z driver released");
    }

    /// Signed step delta to `z_mm`, rounding the absolute target rather than
    /// the difference. Both forms can disagree by one step in f64, but this
    /// one maps a target to a single step count, so repeating a move emits
    /// no pulses.
    fn steps_to(&self, z_mm: f64) -> i64 {
        (z_mm * self.calibration.steps_per_mm).round() as i64 - self.current_step
    }

    fn pulse(&mut self, steps: i64, half_period: Duration) {
        if steps == 0 {
            return;
        }
        let direction = if steps > 0 {
            StepDirection::Up
        } else {
            StepDirection::Down
        };
        self.driver.enable(true);
        self.released = false;
        self.driver.set_direction(direction);
        for _ in 0..steps.unsigned_abs() {
            self.driver.set_step(true);
            self.clock.sleep(half_period);
            self.driver.set_step(false);
            self.clock.sleep(half_period);
        }
        self.current_step += steps;
    }

    fn persist(&self) {
        self.store.save_or_warn(&AxisPosition::new(
            self.current_step as f64,
            self.is_homed,
        ));
    }
}

fn half_period(frequency_hz: f64) -> Duration {
    Duration::from_secs_f64(0.5 / frequency_hz)
}
