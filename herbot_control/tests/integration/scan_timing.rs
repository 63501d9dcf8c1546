//! Time-boxing of the sweep, and what happens under the base while a stop
//! is imaged.

use super::common::*;
use herbot_common::prelude::*;
use herbot_control::collab::{Collaborators, ImageCapture};
use herbot_control::scan::ScanPhase;
use herbot_control::{RigEvent, ScanOrchestrator};
use herbot_hal::drivers::simulation::{HBridgeLineState, LineProbe};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// Longest healthy stop on the default plan: 100 mm of Z at 1 kHz plus the
/// 0.1 s stabilization.
const MAX_HEALTHY_STOP_S: f64 = 0.427 + 0.1;

fn scan(duration_s: f64) -> ScanOrchestrator {
    let mut config = RigConfig::default().scan;
    config.duration_s = duration_s;
    ScanOrchestrator::new(config)
}

#[test]
fn sweep_overruns_budget_by_at_most_one_stop() {
    for duration_s in [0.05, 0.5, 1.0, 4.2, 9.99, 30.0] {
        let mut rig = homed_rig(|_| {}, |_| with_disease(blight_at(-1)));
        let report = scan(duration_s)
            .run(&mut rig.coordinator, &AtomicBool::new(false))
            .unwrap();

        assert!(report.duration_s >= duration_s, "{duration_s}: {}", report.duration_s);
        assert!(
            report.duration_s < duration_s + MAX_HEALTHY_STOP_S + 1e-9,
            "{duration_s}: {}",
            report.duration_s
        );
        assert!(report.total_images >= 1);
    }
}

#[test]
fn stop_records_are_ordered_in_time() {
    let mut rig = homed_rig(|_| {}, |_| with_disease(blight_at(-1)));
    let report = scan(20.0)
        .run(&mut rig.coordinator, &AtomicBool::new(false))
        .unwrap();

    let ids: Vec<u32> = report.records.iter().map(|r| r.scan_id).collect();
    assert_eq!(ids, (1..=report.total_images).collect::<Vec<_>>());
    assert!(report.records.windows(2).all(|w| w[0].elapsed_s < w[1].elapsed_s));
    // up 0..=700 then down from 700 again
    let heights: Vec<i32> = report.records.iter().take(10).map(|r| r.z_mm).collect();
    assert_eq!(heights, vec![0, 100, 200, 300, 400, 500, 600, 700, 700, 600]);
}

/// Spends simulated time per image and notes whether the base was turning.
struct SlowCamera {
    clock: Arc<ManualClock>,
    latency: Duration,
    theta: LineProbe<HBridgeLineState>,
    turning: Arc<Mutex<Vec<bool>>>,
}

impl ImageCapture for SlowCamera {
    fn capture(&mut self, scan_id: u32, z_mm: i32) -> Option<PathBuf> {
        self.turning.lock().push(self.theta.snapshot().is_driving());
        self.clock.advance(self.latency);
        Some(PathBuf::from(format!("scan_{scan_id:03}_z{z_mm:03}.jpg")))
    }
}

#[test]
fn base_keeps_turning_while_imaging_and_latency_stretches_dwell() {
    let turning = Arc::new(Mutex::new(Vec::new()));
    let camera_slot: Arc<Mutex<Option<SlowCamera>>> = Arc::new(Mutex::new(None));

    // The camera needs the rig's clock and θ probe, so it is installed
    // through a forwarding capture once the rig exists.
    struct Forward(Arc<Mutex<Option<SlowCamera>>>);
    impl ImageCapture for Forward {
        fn capture(&mut self, scan_id: u32, z_mm: i32) -> Option<PathBuf> {
            self.0.lock().as_mut()?.capture(scan_id, z_mm)
        }
    }

    let slot = Arc::clone(&camera_slot);
    let mut rig = homed_rig(
        |_| {},
        move |_| Collaborators {
            capture: Box::new(Forward(slot)),
            herb: no_classifier("herb"),
            disease: no_classifier("disease"),
        },
    );
    *camera_slot.lock() = Some(SlowCamera {
        clock: Arc::clone(&rig.clock),
        latency: Duration::from_millis(400),
        theta: rig.probes.theta.clone(),
        turning: Arc::clone(&turning),
    });

    let report = scan(3.0)
        .run(&mut rig.coordinator, &AtomicBool::new(false))
        .unwrap();

    let turning = turning.lock();
    assert_eq!(turning.len() as u32, report.total_images);
    assert!(turning.iter().all(|&t| t));
    // 0 mm: 0.1 + 0.4; 100 mm: 0.427 + 0.1 + 0.4; …
    assert!((report.records[1].elapsed_s - (0.5 + 0.427 + 0.1)).abs() < 1e-9);
    assert!(report.duration_s < 3.0 + MAX_HEALTHY_STOP_S + 0.4);
}

#[test]
fn phases_follow_the_scan_cycle() {
    let mut rig = homed_rig(|_| {}, |_| with_disease(blight_at(100)));
    scan(1.0)
        .run(&mut rig.coordinator, &AtomicBool::new(false))
        .unwrap();

    let phases: Vec<ScanPhase> = rig
        .events
        .events()
        .into_iter()
        .filter_map(|e| match e {
            RigEvent::ScanPhase(p) => Some(p),
            _ => None,
        })
        .collect();
    for pair in phases.windows(2) {
        assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
    }
    assert_eq!(phases.first(), Some(&ScanPhase::Prepare));
    assert_eq!(phases.last(), Some(&ScanPhase::Finalize));
    assert!(phases.contains(&ScanPhase::Continue));
    assert!(phases.contains(&ScanPhase::Remove));
}
