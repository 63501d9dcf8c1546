//! The shipped example configuration.

use herbot_common::config::{ConfigLoader, RigConfig};
use herbot_common::axis::Rotation;
use herbot_control::collab::Collaborators;
use herbot_control::config::load_rig_config;
use std::path::PathBuf;

fn example_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../config/herbot.toml")
}

#[test]
fn example_config_loads_and_validates() {
    let config = load_rig_config(Some(example_path().as_path())).unwrap();

    assert_eq!(config.driver.name, "simulation");
    assert_eq!(config.z_axis.calibration.steps_per_mm, 4.27);
    assert_eq!(config.r_axis.lines.stby, 23);
    assert_eq!(config.scan.rotation, Rotation::Clockwise);
    assert_eq!(config.scan.z_max_mm, 700);
    assert!(config.classifiers.herb.is_some());
}

#[test]
fn example_matches_defaults_outside_classifiers() {
    let example = RigConfig::load(&example_path()).unwrap();
    let defaults = RigConfig::default();

    assert_eq!(example.z_axis.calibration, defaults.z_axis.calibration);
    assert_eq!(example.z_axis.lines, defaults.z_axis.lines);
    assert_eq!(example.r_axis.lines, defaults.r_axis.lines);
    assert_eq!(example.theta_axis.lines, defaults.theta_axis.lines);
    assert_eq!(example.gripper.line, defaults.gripper.line);
    assert_eq!(example.scan.duration_s, defaults.scan.duration_s);
    assert_eq!(example.scan.r_extend_mm, defaults.scan.r_extend_mm);
}

#[test]
fn unresolvable_classifier_leaves_capability_unavailable() {
    let mut config = RigConfig::load(&example_path()).unwrap();
    config.classifiers.disease = None;

    let collaborators = Collaborators::from_config(&config);
    // model files are not shipped
    assert!((collaborators.herb)().is_err());
    assert!((collaborators.disease)().is_err());
}
