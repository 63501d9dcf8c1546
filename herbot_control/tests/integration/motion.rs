//! Composite move ordering, observed at the driver seam.

use super::common::*;
use herbot_common::prelude::*;
use herbot_control::collab::Collaborators;
use herbot_control::event::{CollectingSink, GripperAction};
use herbot_control::{ApproachRequest, MotionCoordinator, MoveRequest, RigEvent, TimedRotation};
use herbot_hal::RigAxes;
use herbot_hal::RigDrivers;
use herbot_hal::driver::{HBridgeDriver, Polarity, ServoDriver, StepDirection, StepDriver};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tempfile::{TempDir, tempdir};

/// Which actuator moved, in order, with repeats collapsed.
#[derive(Clone, Default)]
struct MotionLog(Arc<Mutex<Vec<&'static str>>>);

impl MotionLog {
    fn note(&self, actuator: &'static str) {
        let mut log = self.0.lock();
        if log.last() != Some(&actuator) {
            log.push(actuator);
        }
    }

    fn take(&self) -> Vec<&'static str> {
        std::mem::take(&mut *self.0.lock())
    }
}

struct LoggedStepper(MotionLog);

impl StepDriver for LoggedStepper {
    fn enable(&mut self, _on: bool) {}
    fn set_direction(&mut self, _direction: StepDirection) {}
    fn set_step(&mut self, high: bool) {
        if high {
            self.0.note("Z");
        }
    }
    fn release(&mut self) {}
}

struct LoggedBridge(MotionLog, &'static str);

impl HBridgeDriver for LoggedBridge {
    fn drive(&mut self, _polarity: Polarity, _duty_percent: f64) {
        self.0.note(self.1);
    }
    fn stop(&mut self) {}
    fn set_standby(&mut self, _active: bool) {}
    fn release(&mut self) {}
}

struct LoggedServo(MotionLog);

impl ServoDriver for LoggedServo {
    fn set_duty(&mut self, _duty_percent: f64) {
        self.0.note("grip");
    }
    fn release(&mut self) {}
}

struct LoggedRig {
    coordinator: MotionCoordinator,
    log: MotionLog,
    clock: Arc<ManualClock>,
    events: CollectingSink,
    _dir: TempDir,
}

/// Rig whose Z record says 100 mm, not homed.
fn logged_rig() -> LoggedRig {
    let dir = tempdir().unwrap();
    let mut config = RigConfig::default();
    config.state.dir = dir.path().to_path_buf();
    StatePersistence::new(config.z_state_path())
        .save(&AxisPosition::new(427.0, false))
        .unwrap();

    let log = MotionLog::default();
    let drivers = RigDrivers {
        z: Box::new(LoggedStepper(log.clone())),
        r: Box::new(LoggedBridge(log.clone(), "R")),
        theta: Box::new(LoggedBridge(log.clone(), "θ")),
        gripper: Box::new(LoggedServo(log.clone())),
    };
    let clock = Arc::new(ManualClock::new());
    let axes = RigAxes::build(&config, drivers, clock.clone()).unwrap();
    let events = CollectingSink::new();
    let coordinator = MotionCoordinator::new(
        &config,
        axes,
        Collaborators {
            capture: Box::new(BlindCamera),
            herb: no_classifier("herb"),
            disease: no_classifier("disease"),
        },
        clock.clone(),
        Box::new(events.clone()),
    );
    LoggedRig {
        coordinator,
        log,
        clock,
        events,
        _dir: dir,
    }
}

#[test]
fn restored_position_is_homed_away() {
    let mut rig = logged_rig();
    let status = rig.coordinator.status();
    assert!((status.z_mm - 100.0).abs() < 0.01);
    assert!(!status.z_homed);

    rig.coordinator.home_all();

    // θ homing is logical only
    assert_eq!(rig.log.take(), vec!["R", "Z"]);
    let status = rig.coordinator.status();
    assert_eq!(status.z_mm, 0.0);
    assert!(status.z_homed && status.r_homed && status.theta_homed);
    assert_eq!(rig.events.count(|e| *e == RigEvent::HomingComplete), 1);
}

#[test]
fn move_runs_z_then_theta_then_r() {
    let mut rig = logged_rig();
    rig.coordinator.home_all();
    rig.log.take();

    rig.coordinator
        .move_to_position(MoveRequest {
            z_mm: Some(50.0),
            r_mm: Some(10.0),
            theta: Some(TimedRotation {
                duration: Duration::from_millis(500),
                rotation: Rotation::Clockwise,
            }),
            z_frequency_hz: None,
        })
        .unwrap();

    assert_eq!(rig.log.take(), vec!["Z", "θ", "R"]);
    let status = rig.coordinator.status();
    assert_eq!(status.r_mm, 10.0);
    assert!((status.z_mm - 50.0).abs() < 0.25);
}

#[test]
fn omitted_axes_are_skipped() {
    let mut rig = logged_rig();
    rig.coordinator.home_all();
    rig.log.take();
    let before = rig.clock.now();

    rig.coordinator
        .move_to_position(MoveRequest {
            r_mm: Some(5.0),
            ..MoveRequest::default()
        })
        .unwrap();

    assert_eq!(rig.log.take(), vec!["R"]);
    // 0.5 s drive + one 0.3 s settle
    let elapsed = (rig.clock.now() - before).as_secs_f64();
    assert!((elapsed - 0.8).abs() < 1e-6, "{elapsed}");
}

#[test]
fn approach_sequence_with_cut() {
    let mut rig = logged_rig();
    rig.coordinator.home_all();
    rig.log.take();

    rig.coordinator
        .approach_leaf(ApproachRequest {
            z_mm: 120.0,
            theta_duration: Duration::from_secs(1),
            r_mm: 25.0,
            cut: true,
        })
        .unwrap();

    assert_eq!(rig.log.take(), vec!["grip", "Z", "θ", "R", "grip"]);
    assert_eq!(
        rig.events.count(|e| *e == RigEvent::ApproachComplete { cut: true }),
        1
    );
}

#[test]
fn unhomed_approach_moves_nothing() {
    let mut rig = logged_rig();
    assert!(rig
        .coordinator
        .approach_leaf(ApproachRequest {
            z_mm: 120.0,
            theta_duration: Duration::from_secs(1),
            r_mm: 25.0,
            cut: false,
        })
        .is_err());
    assert!(rig.log.take().is_empty());
}

#[test]
fn gripper_and_raw_actuator_commands() {
    let mut rig = logged_rig();
    rig.coordinator.gripper_action(GripperAction::Close);
    rig.coordinator
        .drive_actuator_raw(LinearDirection::Retract, Duration::from_secs(2));

    assert_eq!(rig.log.take(), vec!["grip", "R"]);
    assert_eq!(rig.coordinator.status().gripper_deg, Some(0.0));
    assert!(!rig.coordinator.status().r_homed);
}

#[test]
fn degraded_collaborators_from_config() {
    let rig = sim_rig(
        |config| {
            config.capture.program = "/nonexistent/libcamera-still".into();
            config.capture.output_dir = config.state.dir.join("captures");
        },
        Collaborators::from_config,
    );
    let mut coordinator = rig.coordinator;
    let status = coordinator.status();
    assert!(!status.herb_classifier);
    assert!(!status.disease_classifier);

    let observation = coordinator.capture_and_classify(
        1,
        0,
        1,
        3,
        herbot_control::disease::DiseasePolicy::default(),
    );
    assert_eq!(observation.image, None);
    assert_eq!(observation.verdict.label, "Unknown");
}
