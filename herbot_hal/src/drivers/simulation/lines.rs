//! Simulated signal lines.
//!
//! Each simulated driver writes into a shared line state that a
//! [`LineProbe`] can read back. Probes are cheap to clone and are the only
//! way to observe what the rig "did" without hardware.

use crate::driver::{HBridgeDriver, Polarity, ServoDriver, StepDirection, StepDriver};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::trace;

/// Shared, inspectable handle onto a simulated line state.
#[derive(Debug, Default)]
pub struct LineProbe<T>(Arc<Mutex<T>>);

impl<T> Clone for LineProbe<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Clone> LineProbe<T> {
    /// Copy of the current line state.
    pub fn snapshot(&self) -> T {
        self.0.lock().clone()
    }
}

impl<T> LineProbe<T> {
    fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.0.lock())
    }
}

// ─── Stepper ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepLineState {
    pub enabled: bool,
    pub direction: Option<StepDirection>,
    pub step_high: bool,
    /// Rising edges seen while enabled, signed by direction.
    pub net_steps: i64,
    /// All rising edges.
    pub pulses: u64,
    pub released: bool,
}

pub struct SimStepDriver {
    probe: LineProbe<StepLineState>,
}

impl SimStepDriver {
    pub fn new() -> (Self, LineProbe<StepLineState>) {
        let probe = LineProbe::default();
        (
            Self {
                probe: probe.clone(),
            },
            probe,
        )
    }
}

impl StepDriver for SimStepDriver {
    fn enable(&mut self, on: bool) {
        self.probe.update(|s| {
            s.enabled = on;
            s.released = false;
        });
    }

    fn set_direction(&mut self, direction: StepDirection) {
        self.probe.update(|s| s.direction = Some(direction));
    }

    fn set_step(&mut self, high: bool) {
        self.probe.update(|s| {
            if high && !s.step_high {
                s.pulses += 1;
                if s.enabled {
                    s.net_steps += match s.direction {
                        Some(StepDirection::Down) => -1,
                        _ => 1,
                    };
                }
            }
            s.step_high = high;
        });
    }

    fn release(&mut self) {
        self.probe.update(|s| {
            s.enabled = false;
            s.step_high = false;
            s.released = true;
        });
        trace!("simulated stepper released");
    }
}

// ─── H-bridge ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HBridgeLineState {
    pub standby: bool,
    /// Current output, `None` when stopped.
    pub output: Option<(Polarity, f64)>,
    /// Most recent `drive` command, kept after a stop.
    pub last_drive: Option<(Polarity, f64)>,
    /// Number of `drive` commands issued.
    pub drive_commands: u64,
    pub released: bool,
}

impl HBridgeLineState {
    pub fn is_driving(&self) -> bool {
        self.output.is_some()
    }
}

pub struct SimHBridgeDriver {
    probe: LineProbe<HBridgeLineState>,
}

impl SimHBridgeDriver {
    pub fn new() -> (Self, LineProbe<HBridgeLineState>) {
        let probe = LineProbe::default();
        (
            Self {
                probe: probe.clone(),
            },
            probe,
        )
    }
}

impl HBridgeDriver for SimHBridgeDriver {
    fn drive(&mut self, polarity: Polarity, duty_percent: f64) {
        self.probe.update(|s| {
            s.output = Some((polarity, duty_percent));
            s.last_drive = s.output;
            s.drive_commands += 1;
            s.released = false;
        });
    }

    fn stop(&mut self) {
        self.probe.update(|s| s.output = None);
    }

    fn set_standby(&mut self, active: bool) {
        self.probe.update(|s| s.standby = active);
    }

    fn release(&mut self) {
        self.probe.update(|s| {
            s.output = None;
            s.released = true;
        });
    }
}

// ─── Servo ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServoLineState {
    /// Duty currently applied, `None` when not pulsing.
    pub duty: Option<f64>,
    /// Every duty ever applied, in order.
    pub history: Vec<f64>,
}

pub struct SimServoDriver {
    probe: LineProbe<ServoLineState>,
}

impl SimServoDriver {
    pub fn new() -> (Self, LineProbe<ServoLineState>) {
        let probe = LineProbe::default();
        (
            Self {
                probe: probe.clone(),
            },
            probe,
        )
    }
}

impl ServoDriver for SimServoDriver {
    fn set_duty(&mut self, duty_percent: f64) {
        self.probe.update(|s| {
            s.duty = Some(duty_percent);
            s.history.push(duty_percent);
        });
    }

    fn release(&mut self) {
        self.probe.update(|s| s.duty = None);
    }
}
