//! Faults inside a scan: whatever goes wrong, the rig ends safe and
//! finalize runs exactly once.

use super::common::*;
use herbot_common::axis::AxisId;
use herbot_common::config::RigConfig;
use herbot_control::collab::{Classifier, ClassifierError, Collaborators, ImageCapture};
use herbot_control::coordinator::MotionError;
use herbot_control::scan::ScanAbort;
use herbot_control::{RigEvent, ScanOrchestrator};
use herbot_hal::AxisError;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

fn short_scan(config: &RigConfig, duration_s: f64) -> ScanOrchestrator {
    let mut scan = config.scan.clone();
    scan.duration_s = duration_s;
    scan.z_min_mm = 100;
    scan.z_max_mm = 300;
    ScanOrchestrator::new(scan)
}

fn finalized(rig: &SimRig) -> usize {
    rig.events.count(|e| *e == RigEvent::ScanFinalized)
}

#[test]
fn classifier_panic_still_finalizes() {
    let mut rig = homed_rig(
        |_| {},
        |_| {
            with_disease(Box::new(Scripted(
                |_: &Path| -> Result<Vec<(String, f64)>, ClassifierError> {
                    panic!("model runtime crashed")
                },
            )))
        },
    );
    let orchestrator = short_scan(&RigConfig::default(), 30.0);
    let cancel = AtomicBool::new(false);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        orchestrator.run(&mut rig.coordinator, &cancel)
    }));

    assert!(outcome.is_err());
    assert_rig_safe(&rig);
    assert_eq!(finalized(&rig), 1);
}

#[test]
fn removal_fault_aborts_with_partial_report() {
    let mut rig = homed_rig(|_| {}, |_| with_disease(blight_at(200)));
    let mut scan = RigConfig::default().scan;
    scan.duration_s = 30.0;
    scan.z_min_mm = 100;
    scan.z_max_mm = 300;
    // beyond the 50 mm stroke
    scan.r_extend_mm = 80.0;

    let err = ScanOrchestrator::new(scan)
        .run(&mut rig.coordinator, &AtomicBool::new(false))
        .unwrap_err();

    assert!(matches!(
        err.cause,
        ScanAbort::Motion(MotionError::Axis(AxisError::OutOfRange { axis: AxisId::R, .. }))
    ));
    assert!(!err.is_interrupted());
    assert_eq!(err.report.total_images, 2);
    assert_eq!(err.report.diseased_detected, 1);
    assert_eq!(err.report.cuts_performed, 0);
    // the failing stop is not recorded
    assert_eq!(err.report.records.len(), 1);
    assert_eq!(err.report.records[0].z_mm, 100);
    // removal pauses ran before the failing extend
    assert!(err.report.duration_s > err.report.records[0].elapsed_s);

    assert_rig_safe(&rig);
    assert_eq!(finalized(&rig), 1);
}

/// Raises the cancel flag while taking the `after`-th image.
struct CancellingCamera {
    cancel: Arc<AtomicBool>,
    taken: Arc<AtomicU32>,
    after: u32,
}

impl ImageCapture for CancellingCamera {
    fn capture(&mut self, scan_id: u32, z_mm: i32) -> Option<PathBuf> {
        if self.taken.fetch_add(1, Ordering::SeqCst) + 1 == self.after {
            self.cancel.store(true, Ordering::SeqCst);
        }
        Some(PathBuf::from(format!("scan_{scan_id:03}_z{z_mm:03}.jpg")))
    }
}

#[test]
fn interrupt_stops_at_next_stop_boundary() {
    let cancel = Arc::new(AtomicBool::new(false));
    let taken = Arc::new(AtomicU32::new(0));
    let camera = CancellingCamera {
        cancel: Arc::clone(&cancel),
        taken: Arc::clone(&taken),
        after: 3,
    };
    let mut rig = homed_rig(
        |_| {},
        move |_| Collaborators {
            capture: Box::new(camera),
            herb: no_classifier("herb"),
            disease: no_classifier("disease"),
        },
    );

    let err = short_scan(&RigConfig::default(), 600.0)
        .run(&mut rig.coordinator, &cancel)
        .unwrap_err();

    assert!(err.is_interrupted());
    assert_eq!(err.report.total_images, 3);
    assert_eq!(taken.load(Ordering::SeqCst), 3);
    assert_eq!(err.report.records.len(), 3);
    let last = err.report.records.last().unwrap();
    assert!(last.elapsed_s > 0.0);
    assert!(err.report.duration_s >= last.elapsed_s);
    assert_rig_safe(&rig);
    assert_eq!(finalized(&rig), 1);
}

#[test]
fn blind_camera_degrades_without_aborting() {
    let mut rig = homed_rig(
        |_| {},
        |_| Collaborators {
            capture: Box::new(BlindCamera),
            herb: no_classifier("herb"),
            disease: Box::new(|| Ok(blight_at(100))),
        },
    );

    let report = short_scan(&RigConfig::default(), 5.0)
        .run(&mut rig.coordinator, &AtomicBool::new(false))
        .unwrap();

    assert!(report.total_images > 0);
    assert_eq!(report.cuts_performed, 0);
    assert!(report.records.iter().all(|r| r.image.is_none()));
    assert!(report.records.iter().all(|r| r.disease_class == "Unknown"));
    assert!(report.records.iter().all(|r| r.herb_name == "Unknown"));
    assert_rig_safe(&rig);
}

#[test]
fn classifier_errors_are_recorded_not_raised() {
    let failing: Box<dyn Classifier> = Box::new(Scripted(|_: &Path| {
        Err::<Vec<(String, f64)>, _>(ClassifierError::Invocation("exit status 1".into()))
    }));
    let mut rig = homed_rig(|_| {}, move |_| with_disease(failing));

    let report = short_scan(&RigConfig::default(), 2.0)
        .run(&mut rig.coordinator, &AtomicBool::new(false))
        .unwrap();

    assert!(report.total_images > 0);
    assert!(report.records.iter().all(|r| r.disease_class == "Error"));
    assert_eq!(report.diseased_detected, 0);
}

#[test]
fn unhomed_rig_still_scans_and_ends_safe() {
    let mut rig = sim_rig(|_| {}, |_| with_disease(blight_at(100)));

    let report = short_scan(&RigConfig::default(), 10.0)
        .run(&mut rig.coordinator, &AtomicBool::new(false))
        .unwrap();

    // PREPARE homes R by its timed retract, so removals can reach out
    assert!(rig.coordinator.status().r_homed);
    assert!(report.cuts_performed >= 1);
    assert_rig_safe(&rig);
}
