//! Shared fixtures: a simulated rig on a manual clock, scripted cameras and
//! classifiers.

use herbot_common::prelude::*;
use herbot_control::MotionCoordinator;
use herbot_control::collab::{
    Classifier, ClassifierError, Collaborators, ImageCapture, Prediction, Predictions,
};
use herbot_control::event::CollectingSink;
use herbot_hal::RigAxes;
use herbot_hal::drivers::simulation::{self, SimProbes};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::{TempDir, tempdir};

pub struct SimRig {
    pub coordinator: MotionCoordinator,
    pub probes: SimProbes,
    pub clock: Arc<ManualClock>,
    pub events: CollectingSink,
    pub _dir: TempDir,
}

/// Rig with state files in a fresh temp dir. `tweak` runs before the axes
/// and collaborators are built.
pub fn sim_rig(
    tweak: impl FnOnce(&mut RigConfig),
    collaborators: impl FnOnce(&RigConfig) -> Collaborators,
) -> SimRig {
    let dir = tempdir().unwrap();
    let mut config = RigConfig::default();
    config.state.dir = dir.path().to_path_buf();
    tweak(&mut config);

    let (drivers, probes) = simulation::open(&config);
    let clock = Arc::new(ManualClock::new());
    let axes = RigAxes::build(&config, drivers, clock.clone()).unwrap();
    let events = CollectingSink::new();
    let coordinator = MotionCoordinator::new(
        &config,
        axes,
        collaborators(&config),
        clock.clone(),
        Box::new(events.clone()),
    );
    SimRig {
        coordinator,
        probes,
        clock,
        events,
        _dir: dir,
    }
}

/// Homed rig.
pub fn homed_rig(
    tweak: impl FnOnce(&mut RigConfig),
    collaborators: impl FnOnce(&RigConfig) -> Collaborators,
) -> SimRig {
    let mut rig = sim_rig(tweak, collaborators);
    rig.coordinator.home_all();
    rig
}

// ─── Collaborators ──────────────────────────────────────────────────

/// Names every image after its stop so classifiers can key on height.
pub struct StopCamera;

impl ImageCapture for StopCamera {
    fn capture(&mut self, scan_id: u32, z_mm: i32) -> Option<PathBuf> {
        Some(PathBuf::from(format!("scan_{scan_id:03}_z{z_mm:03}.jpg")))
    }
}

/// Camera that never produces an image.
pub struct BlindCamera;

impl ImageCapture for BlindCamera {
    fn capture(&mut self, _scan_id: u32, _z_mm: i32) -> Option<PathBuf> {
        None
    }
}

/// Classifier answering from a closure over the image path.
pub struct Scripted<F>(pub F);

impl<F> Classifier for Scripted<F>
where
    F: FnMut(&Path) -> Result<Vec<(String, f64)>, ClassifierError> + Send,
{
    fn name(&self) -> &str {
        "scripted"
    }

    fn predict(
        &mut self,
        image: Option<&Path>,
        top_k: usize,
    ) -> Result<Predictions, ClassifierError> {
        let Some(image) = image else {
            return Ok(Predictions::default());
        };
        let mut ranked: Vec<Prediction> = (self.0)(image)?
            .into_iter()
            .map(|(label, confidence)| Prediction { label, confidence })
            .collect();
        ranked.truncate(top_k);
        Ok(Predictions {
            ranked,
            latency_ms: 12.5,
        })
    }
}

/// Disease classifier that flags the stop at `z_mm` with a confident blight.
pub fn blight_at(z_mm: i32) -> Box<dyn Classifier> {
    let marker = format!("_z{z_mm:03}");
    Box::new(Scripted(move |image: &Path| {
        let label = if image.to_string_lossy().contains(&marker) {
            "Tomato Early Blight"
        } else {
            "Tomato leaf"
        };
        Ok::<_, ClassifierError>(vec![(label.to_string(), 0.82)])
    }))
}

pub fn no_classifier(role: &'static str) -> herbot_control::collab::ClassifierFactory {
    Box::new(move || Err(ClassifierError::NotConfigured(role)))
}

/// Stop camera, no herb classifier, the given disease classifier.
pub fn with_disease(disease: Box<dyn Classifier>) -> Collaborators {
    Collaborators {
        capture: Box::new(StopCamera),
        herb: no_classifier("herb"),
        disease: Box::new(move || Ok(disease)),
    }
}

/// Asserts the safe resting configuration.
pub fn assert_rig_safe(rig: &SimRig) {
    let status = rig.coordinator.status();
    assert!(!status.theta_rotating, "θ still commanded");
    assert!(!rig.probes.theta.snapshot().is_driving(), "θ bridge still driving");
    assert!(!rig.probes.r.snapshot().is_driving(), "R bridge still driving");
    assert_eq!(status.r_mm, 0.0);
    assert_eq!(status.z_mm, 0.0);
    assert_eq!(status.gripper_deg, Some(90.0));
}
