//! Motion coordinator.
//!
//! Owns the four axis controllers, the capture collaborator and the two
//! optional classifiers, and sequences them into the rig's composite
//! operations. Single control thread; every wait goes through the clock.
//!
//! Higher-level moves check homing up front: an unhomed Z or R that the
//! move would position absolutely refuses the whole move before any signal
//! is issued.

use crate::collab::{Capability, Classifier, Collaborators, ImageCapture, Prediction};
use crate::disease::{DiseasePolicy, DiseaseVerdict};
use crate::event::{EventSink, GripperAction, RigEvent};
use herbot_common::axis::{AxisId, LinearDirection, Rotation};
use herbot_common::config::{MotionConfig, RigConfig};
use herbot_common::timing::{Clock, seconds};
use herbot_hal::{AxisError, HalError, RigAxes};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// Composite motion failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    #[error(transparent)]
    Axis(#[from] AxisError),

    #[error("driver error: {0}")]
    Hal(String),
}

impl From<HalError> for MotionError {
    fn from(e: HalError) -> Self {
        Self::Hal(e.to_string())
    }
}

/// Timed Θ rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedRotation {
    pub duration: Duration,
    pub rotation: Rotation,
}

/// Any subset of a point-to-point move. `None` skips that axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveRequest {
    pub z_mm: Option<f64>,
    pub r_mm: Option<f64>,
    pub theta: Option<TimedRotation>,
    /// Overrides the configured Z step frequency.
    pub z_frequency_hz: Option<f64>,
}

/// Reach-and-optionally-cut request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproachRequest {
    pub z_mm: f64,
    pub theta_duration: Duration,
    pub r_mm: f64,
    pub cut: bool,
}

/// Snapshot of every axis estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RigStatus {
    pub z_mm: f64,
    pub z_homed: bool,
    pub r_mm: f64,
    pub r_homed: bool,
    /// Reference angle from the last home, not a live reading.
    pub theta_deg: f64,
    pub theta_homed: bool,
    pub theta_rotating: bool,
    pub gripper_deg: Option<f64>,
    pub herb_classifier: bool,
    pub disease_classifier: bool,
}

/// Result of imaging and classifying one stop.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub image: Option<PathBuf>,
    pub herb: Option<Prediction>,
    pub verdict: DiseaseVerdict,
}

pub struct MotionCoordinator {
    axes: RigAxes,
    capture: Box<dyn ImageCapture>,
    herb: Capability<Box<dyn Classifier>>,
    disease: Capability<Box<dyn Classifier>>,
    clock: Arc<dyn Clock>,
    events: Box<dyn EventSink>,
    motion: MotionConfig,
    z_frequency_hz: f64,
    r_speed_mm_s: f64,
    r_home_time: Duration,
    theta_speed_percent: u8,
    shut_down: bool,
}

impl MotionCoordinator {
    /// Bind the axes and try each classifier independently. A classifier
    /// that fails to construct leaves that capability unavailable.
    pub fn new(
        config: &RigConfig,
        axes: RigAxes,
        collaborators: Collaborators,
        clock: Arc<dyn Clock>,
        events: Box<dyn EventSink>,
    ) -> Self {
        let Collaborators {
            capture,
            herb,
            disease,
        } = collaborators;

        Self {
            axes,
            capture,
            herb: Capability::from_result("Herb classifier", herb()),
            disease: Capability::from_result("Disease classifier", disease()),
            clock,
            events,
            motion: config.motion.clone(),
            z_frequency_hz: config.z_axis.frequency_hz,
            r_speed_mm_s: config.r_axis.speed_mm_s,
            r_home_time: seconds(config.r_axis.home_time_s),
            theta_speed_percent: config.theta_axis.speed_percent,
            shut_down: false,
        }
    }

    // ─── Composite moves ────────────────────────────────────────────

    /// R (clears obstructions), then Z, then Θ, settling between each.
    pub fn home_all(&mut self) {
        info!("Homing all axes");
        self.axes.r.home(self.r_home_time);
        self.emit(RigEvent::AxisHomed(AxisId::R));
        self.settle(self.motion.home_settle_s);

        self.axes.z.home();
        self.emit(RigEvent::AxisHomed(AxisId::Z));
        self.settle(self.motion.home_settle_s);

        self.axes.theta.home();
        self.emit(RigEvent::AxisHomed(AxisId::Theta));
        self.emit(RigEvent::HomingComplete);
        info!("All axes homed");
    }

    /// Z, then Θ, then R, each followed by a settle pause.
    pub fn move_to_position(&mut self, request: MoveRequest) -> Result<(), MotionError> {
        self.require_homed(request.z_mm.is_some(), request.r_mm.is_some())?;
        let settle = self.motion.move_settle_s;

        if let Some(z_mm) = request.z_mm {
            let frequency = request.z_frequency_hz.unwrap_or(self.z_frequency_hz);
            self.axes.z.move_to_absolute(z_mm, frequency)?.into_result()?;
            self.settle(settle);
        }
        if let Some(theta) = request.theta {
            self.axes
                .theta
                .rotate(theta.rotation, theta.duration, self.theta_speed_percent)?;
            self.settle(settle);
        }
        if let Some(r_mm) = request.r_mm {
            self.axes.r.move_to_absolute(r_mm, self.r_speed_mm_s)?;
            self.settle(settle);
        }

        self.emit(RigEvent::PositionReached {
            z_mm: request.z_mm,
            r_mm: request.r_mm,
            rotated: request.theta.map(|t| (t.rotation, t.duration)),
        });
        Ok(())
    }

    /// Open, Z, Θ clockwise, R, then optionally cut. No rollback: the first
    /// failing step ends the sequence.
    pub fn approach_leaf(&mut self, request: ApproachRequest) -> Result<(), MotionError> {
        self.require_homed(true, true)?;
        info!(
            "Approaching leaf at Z={} mm, θ {:.1} s, R={} mm (cut: {})",
            request.z_mm,
            request.theta_duration.as_secs_f64(),
            request.r_mm,
            request.cut
        );
        let settle = self.motion.approach_settle_s;

        let hold = self.axes.gripper.default_hold();
        self.axes.gripper.open(hold);
        self.settle(self.motion.approach_open_settle_s);

        self.axes
            .z
            .move_to_absolute(request.z_mm, self.motion.approach_z_frequency_hz)?
            .into_result()?;
        self.settle(settle);

        self.axes.theta.rotate(
            Rotation::Clockwise,
            request.theta_duration,
            self.theta_speed_percent,
        )?;
        self.settle(settle);

        self.axes.r.move_to_absolute(request.r_mm, self.r_speed_mm_s)?;
        self.settle(settle);

        if request.cut {
            self.axes.gripper.cut(seconds(self.motion.cut_time_s));
            self.settle(settle);
        }

        self.emit(RigEvent::ApproachComplete { cut: request.cut });
        Ok(())
    }

    /// Rotate-only scan: slow blocking turn of the base.
    pub fn scan_mode(
        &mut self,
        duration: Duration,
        rotation: Rotation,
        speed_percent: u8,
    ) -> Result<(), MotionError> {
        self.axes.theta.scan_rotate(duration, rotation, speed_percent)?;
        self.emit(RigEvent::ScanRotationComplete(duration));
        Ok(())
    }

    pub fn gripper_action(&mut self, action: GripperAction) {
        let hold = self.axes.gripper.default_hold();
        match action {
            GripperAction::Open => self.axes.gripper.open(hold),
            GripperAction::Close => self.axes.gripper.close(hold),
            GripperAction::Cut => self.axes.gripper.cut(seconds(self.motion.cut_time_s)),
        }
        self.emit(RigEvent::Gripper(action));
    }

    /// Raw timed R drive. The position estimate is not updated.
    pub fn drive_actuator_raw(&mut self, direction: LinearDirection, duration: Duration) {
        self.axes.r.drive_raw(direction, duration);
        self.emit(RigEvent::ActuatorDriven {
            direction,
            duration,
        });
    }

    pub fn status(&self) -> RigStatus {
        RigStatus {
            z_mm: self.axes.z.position_mm(),
            z_homed: self.axes.z.is_homed(),
            r_mm: self.axes.r.position_mm(),
            r_homed: self.axes.r.is_homed(),
            theta_deg: self.axes.theta.reference_angle_deg(),
            theta_homed: self.axes.theta.is_homed(),
            theta_rotating: self.axes.theta.active_drive().is_some(),
            gripper_deg: self.axes.gripper.current_angle(),
            herb_classifier: self.herb.is_available(),
            disease_classifier: self.disease.is_available(),
        }
    }

    // ─── Classification ─────────────────────────────────────────────

    /// Top `top_k` herb labels; empty when there is no image, no
    /// classifier, or the call failed.
    pub fn identify_herb(&mut self, image: Option<&Path>, top_k: usize) -> Vec<Prediction> {
        let (Some(image), Some(classifier)) = (image, self.herb.get_mut()) else {
            return Vec::new();
        };
        match classifier.predict(Some(image), top_k) {
            Ok(predictions) => predictions.ranked,
            Err(e) => {
                warn!("Herb identification error: {e}");
                Vec::new()
            }
        }
    }

    /// Verdict on the disease classifier's top label.
    pub fn detect_disease(
        &mut self,
        image: Option<&Path>,
        top_k: usize,
        policy: DiseasePolicy,
    ) -> DiseaseVerdict {
        let (Some(image), Some(classifier)) = (image, self.disease.get_mut()) else {
            return DiseaseVerdict::unknown();
        };
        match classifier.predict(Some(image), top_k) {
            Ok(predictions) => match predictions.top() {
                Some(top) => policy
                    .verdict(&top.label, top.confidence)
                    .with_inference_ms(predictions.latency_ms),
                None => {
                    warn!("Disease detection error: classifier returned no labels");
                    DiseaseVerdict::error()
                }
            },
            Err(e) => {
                warn!("Disease detection error: {e}");
                DiseaseVerdict::error()
            }
        }
    }

    /// Capture one still. `None` when the camera produced nothing.
    pub fn capture_image(&mut self, scan_id: u32, z_mm: i32) -> Option<PathBuf> {
        let image = self.capture.capture(scan_id, z_mm);
        self.emit(RigEvent::ImageCaptured {
            scan_id,
            z_mm,
            image: image.clone(),
        });
        image
    }

    /// Herb top-1 and disease verdict for one captured image.
    pub fn classify_image(
        &mut self,
        scan_id: u32,
        image: Option<PathBuf>,
        herb_top_k: usize,
        disease_top_k: usize,
        policy: DiseasePolicy,
    ) -> Observation {
        let herb = self
            .identify_herb(image.as_deref(), herb_top_k)
            .into_iter()
            .next();
        let verdict = self.detect_disease(image.as_deref(), disease_top_k, policy);
        self.emit(RigEvent::StopClassified {
            scan_id,
            herb: herb.as_ref().map(|p| p.label.clone()),
            verdict: verdict.clone(),
        });

        Observation {
            image,
            herb,
            verdict,
        }
    }

    /// Capture one image and run both classifiers on it. Never fails: a
    /// missing image or classifier degrades to sentinel results.
    pub fn capture_and_classify(
        &mut self,
        scan_id: u32,
        z_mm: i32,
        herb_top_k: usize,
        disease_top_k: usize,
        policy: DiseasePolicy,
    ) -> Observation {
        let image = self.capture_image(scan_id, z_mm);
        self.classify_image(scan_id, image, herb_top_k, disease_top_k, policy)
    }

    /// The disease-verdict policy on explicit values.
    pub fn classify_disease(
        &self,
        label: &str,
        confidence: f64,
        threshold: f64,
        min_confidence: f64,
    ) -> DiseaseVerdict {
        crate::disease::classify_disease(label, confidence, threshold, min_confidence)
    }

    // ─── Scan support ───────────────────────────────────────────────

    pub(crate) fn axes_mut(&mut self) -> &mut RigAxes {
        &mut self.axes
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn r_speed_mm_s(&self) -> f64 {
        self.r_speed_mm_s
    }

    /// R to 0. An unhomed R cannot move absolutely, so it is homed by the
    /// timed retract instead; either way it ends at 0.
    pub(crate) fn retract_reach(&mut self) -> Result<(), MotionError> {
        if self.axes.r.is_homed() {
            self.axes.r.move_to_absolute(0.0, self.r_speed_mm_s)?;
        } else {
            warn!("R not homed; retracting with a timed home instead");
            self.axes.r.home(self.r_home_time);
        }
        Ok(())
    }

    pub(crate) fn settle(&self, secs: f64) {
        self.clock.sleep_secs(secs);
    }

    pub fn emit(&mut self, event: RigEvent) {
        self.events.emit(event);
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Stop Θ, stop R and lower its standby, disable Z, release the servo.
    /// Idempotent; also run on drop.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        info!("Shutting down rig");
        self.axes.release();
        self.shut_down = true;
        self.emit(RigEvent::Shutdown);
    }

    fn require_homed(&self, z: bool, r: bool) -> Result<(), MotionError> {
        if z && !self.axes.z.is_homed() {
            error!("Z axis not homed; home first");
            return Err(AxisError::NotHomed(AxisId::Z).into());
        }
        if r && !self.axes.r.is_homed() {
            error!("R axis not homed; home first");
            return Err(AxisError::NotHomed(AxisId::R).into());
        }
        Ok(())
    }
}

impl Drop for MotionCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
