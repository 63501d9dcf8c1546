//! R axis: timed linear actuator on an H-bridge.
//!
//! There is no encoder. Position is `duration × speed`, so accuracy rests
//! entirely on the speed calibration. Homing retracts long enough to hit
//! the actuator's own end stop.

use super::AxisError;
use crate::driver::{HBridgeDriver, Polarity};
use herbot_common::axis::{AxisId, LinearDirection};
use herbot_common::state::{AxisPosition, StatePersistence};
use herbot_common::timing::Clock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const FULL_DUTY: f64 = 100.0;

pub struct LinearAxis {
    driver: Box<dyn HBridgeDriver>,
    clock: Arc<dyn Clock>,
    stroke_mm: f64,
    position_mm: f64,
    is_homed: bool,
    store: StatePersistence,
    released: bool,
}

impl LinearAxis {
    /// Bind the driver, raise standby and restore the persisted position.
    pub fn new(
        mut driver: Box<dyn HBridgeDriver>,
        stroke_mm: f64,
        store: StatePersistence,
        clock: Arc<dyn Clock>,
    ) -> Self {
        driver.set_standby(true);
        let record = store.load_or_default();
        let in_travel = (0.0..=stroke_mm).contains(&record.position);
        if !in_travel {
            warn!(
                "Restored R position {:.1} mm from {} is outside 0..={stroke_mm} mm; R not homed",
                record.position,
                store.path().display()
            );
        }
        info!(
            "R axis ready: {:.1} mm of {stroke_mm} mm, homed={}",
            record.position, record.is_homed
        );
        Self {
            driver,
            clock,
            stroke_mm,
            position_mm: record.position,
            is_homed: record.is_homed && in_travel,
            store,
            released: false,
        }
    }

    /// Full-duty drive for a literal duration. The position estimate is not
    /// touched.
    pub fn drive_raw(&mut self, direction: LinearDirection, duration: Duration) {
        debug!("R raw {direction:?} for {:.2} s", duration.as_secs_f64());
        self.drive(direction, duration);
    }

    /// Move to `r_mm` from the retracted end at `speed_mm_s`.
    ///
    /// # Errors
    /// `NotHomed` or `OutOfRange` with no motion; `InvalidParameter` for a
    /// non-positive speed.
    pub fn move_to_absolute(&mut self, r_mm: f64, speed_mm_s: f64) -> Result<(), AxisError> {
        if !self.is_homed {
            error!("R axis not homed; refusing move to {r_mm} mm");
            return Err(AxisError::NotHomed(AxisId::R));
        }
        if !(0.0..=self.stroke_mm).contains(&r_mm) {
            error!("R target {r_mm} mm outside [0, {}] mm", self.stroke_mm);
            return Err(AxisError::OutOfRange {
                axis: AxisId::R,
                target: r_mm,
                max: self.stroke_mm,
            });
        }
        if !(speed_mm_s.is_finite() && speed_mm_s > 0.0) {
            return Err(AxisError::InvalidParameter(format!(
                "R speed must be > 0 mm/s (got {speed_mm_s})"
            )));
        }

        let distance = r_mm - self.position_mm;
        if distance != 0.0 {
            let duration = Duration::try_from_secs_f64(distance.abs() / speed_mm_s)
                .map_err(|e| AxisError::InvalidParameter(format!("R drive time: {e}")))?;
            let direction = if distance > 0.0 {
                LinearDirection::Extend
            } else {
                LinearDirection::Retract
            };
            debug!(
                "R {:.1} mm -> {r_mm} mm ({direction:?}, {:.2} s)",
                self.position_mm,
                duration.as_secs_f64()
            );
            self.drive(direction, duration);
        }
        self.position_mm = r_mm;
        self.persist();
        Ok(())
    }

    /// Retract for `max_time` and call that zero.
    pub fn home(&mut self, max_time: Duration) {
        info!("Homing R: retracting for {:.1} s", max_time.as_secs_f64());
        self.drive(LinearDirection::Retract, max_time);
        self.position_mm = 0.0;
        self.is_homed = true;
        self.persist();
        info!("R homed");
    }

    pub fn position_mm(&self) -> f64 {
        self.position_mm
    }

    pub fn is_homed(&self) -> bool {
        self.is_homed
    }

    pub fn stroke_mm(&self) -> f64 {
        self.stroke_mm
    }

    /// Stop, lower standby and release the lines. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.driver.stop();
        self.driver.set_standby(false);
        self.driver.release();
        self.released = true;
        debug!("R driver released");
    }

    fn drive(&mut self, direction: LinearDirection, duration: Duration) {
        let polarity = match direction {
            LinearDirection::Extend => Polarity::Forward,
            LinearDirection::Retract => Polarity::Reverse,
        };
        self.driver.drive(polarity, FULL_DUTY);
        self.clock.sleep(duration);
        self.driver.stop();
    }

    fn persist(&self) {
        self.store
            .save_or_warn(&AxisPosition::new(self.position_mm, self.is_homed));
    }
}
