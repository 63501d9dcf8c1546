//! Simulation driver.
//!
//! Opens one in-memory driver per actuator. Nothing moves; every command is
//! recorded in a line state readable through [`SimProbes`].

mod lines;

pub use lines::{
    HBridgeLineState, LineProbe, ServoLineState, SimHBridgeDriver, SimServoDriver,
    SimStepDriver, StepLineState,
};

use crate::driver::{HalError, RigDrivers};
use herbot_common::config::RigConfig;
use tracing::info;

/// Registry name of the simulation driver.
pub const DRIVER_NAME: &str = "simulation";

/// Read-back handles for every simulated actuator.
#[derive(Debug, Clone)]
pub struct SimProbes {
    pub z: LineProbe<StepLineState>,
    pub r: LineProbe<HBridgeLineState>,
    pub theta: LineProbe<HBridgeLineState>,
    pub gripper: LineProbe<ServoLineState>,
}

/// Open a simulated driver set and keep its probes.
pub fn open(config: &RigConfig) -> (RigDrivers, SimProbes) {
    let z = config.z_axis.lines;
    let r = config.r_axis.lines;
    let theta = config.theta_axis.lines;
    info!(
        "Simulated lines: Z(EN={} STEP={} DIR={}) R(EN={} IN1={} IN2={} STBY={}) \
         θ(EN={} IN1={} IN2={} STBY={}) servo(PIN={})",
        z.enable,
        z.step,
        z.dir,
        r.enable,
        r.in1,
        r.in2,
        r.stby,
        theta.enable,
        theta.in1,
        theta.in2,
        theta.stby,
        config.gripper.line.pin
    );

    let (z_driver, z_probe) = SimStepDriver::new();
    let (r_driver, r_probe) = SimHBridgeDriver::new();
    let (theta_driver, theta_probe) = SimHBridgeDriver::new();
    let (gripper_driver, gripper_probe) = SimServoDriver::new();

    let drivers = RigDrivers {
        z: Box::new(z_driver),
        r: Box::new(r_driver),
        theta: Box::new(theta_driver),
        gripper: Box::new(gripper_driver),
    };
    let probes = SimProbes {
        z: z_probe,
        r: r_probe,
        theta: theta_probe,
        gripper: gripper_probe,
    };
    (drivers, probes)
}

/// Registry factory. Probes are dropped.
pub fn create_drivers(config: &RigConfig) -> Result<RigDrivers, HalError> {
    Ok(open(config).0)
}
