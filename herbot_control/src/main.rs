//! # Herbot Binary
//!
//! Command-line front end of the herb-care rig: homing, point-to-point
//! moves, leaf approach and the time-boxed scan-and-manage run.
//!
//! # Usage
//!
//! ```bash
//! # Home every axis, then print the axis estimates
//! herbot home
//! herbot status
//!
//! # Reach a leaf at Z=300 mm, 2 s of base rotation, R=25 mm, and cut it
//! herbot approach --z 300 --theta-s 2 --r 25 --cut
//!
//! # Two-minute scan-and-manage run, JSON logs, report to a file
//! herbot --json manage --duration 120 --report scan.json
//!
//! # Dry run on the simulation driver without real waits
//! herbot --virtual-time manage --duration 60
//! ```
//!
//! Ctrl-C stops a running scan at its next stop and still returns the rig to
//! its safe configuration; a second Ctrl-C exits at once.

use clap::{Parser, Subcommand, ValueEnum};
use herbot_common::axis::{LinearDirection, Rotation};
use herbot_common::config::{LogLevel, RigConfig};
use herbot_common::consts::{DEFAULT_SCAN_MODE_DURATION_S, DEFAULT_THETA_SCAN_SPEED_PERCENT};
use herbot_common::timing::{Clock, ManualClock, SystemClock, seconds};
use herbot_control::collab::Collaborators;
use herbot_control::config::load_rig_config;
use herbot_control::event::{GripperAction, TracingSink};
use herbot_control::{
    ApproachRequest, MotionCoordinator, MoveRequest, ScanOrchestrator, ScanReport, TimedRotation,
};
use herbot_hal::drivers::simulation;
use herbot_hal::{DriverRegistry, RigAxes};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Herbot - herb-care rig controller
#[derive(Parser, Debug)]
#[command(name = "herbot")]
#[command(version)]
#[command(about = "Z/R/θ herb-care rig: homing, leaf approach and scan-and-manage")]
#[command(long_about = None)]
struct Args {
    /// Rig configuration file. Defaults to ./herbot.toml, or built-in
    /// defaults when that is absent.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,

    /// Skip real waits (simulation only)
    #[arg(long)]
    virtual_time: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Home R, then Z, then θ
    Home,

    /// Move any subset of Z, θ and R (in that order)
    Move {
        /// Z target [mm]
        #[arg(long)]
        z: Option<f64>,
        /// R target [mm]
        #[arg(long)]
        r: Option<f64>,
        /// θ rotation time [s]
        #[arg(long)]
        theta_s: Option<f64>,
        /// Rotate θ counter-clockwise
        #[arg(long)]
        ccw: bool,
        /// Z step frequency [Hz]
        #[arg(long)]
        z_speed: Option<f64>,
    },

    /// Rotate the base slowly for a while
    Scan {
        /// Rotation time [s]
        #[arg(long, default_value_t = DEFAULT_SCAN_MODE_DURATION_S)]
        duration: f64,
        /// Motor duty [%]
        #[arg(long, default_value_t = DEFAULT_THETA_SCAN_SPEED_PERCENT)]
        speed: u8,
        /// Rotate counter-clockwise
        #[arg(long)]
        ccw: bool,
    },

    /// Open, move Z, rotate θ, extend R and optionally cut
    Approach {
        /// Z target [mm]
        #[arg(long)]
        z: f64,
        /// θ rotation time [s]
        #[arg(long, default_value_t = 0.0)]
        theta_s: f64,
        /// R reach [mm]
        #[arg(long)]
        r: f64,
        /// Cut once in reach
        #[arg(long)]
        cut: bool,
    },

    /// Open, close or cut with the gripper
    Gripper {
        #[arg(value_enum)]
        action: GripperArg,
    },

    /// Drive the R actuator for a fixed time without tracking position
    Actuator {
        #[arg(value_enum)]
        direction: DirectionArg,
        /// Drive time [s]
        #[arg(long, default_value_t = 1.0)]
        seconds: f64,
    },

    /// Time-boxed scan-and-manage run
    Manage {
        /// Scan duration [s]
        #[arg(long)]
        duration: Option<f64>,
        /// Lowest Z stop [mm]
        #[arg(long)]
        z_min: Option<i32>,
        /// Highest Z stop [mm]
        #[arg(long)]
        z_max: Option<i32>,
        /// Spacing of Z stops [mm]
        #[arg(long)]
        z_step: Option<u32>,
        /// R reach for removals [mm]
        #[arg(long)]
        r_extend: Option<f64>,
        /// Disease confidence threshold
        #[arg(long)]
        threshold: Option<f64>,
        /// Write the JSON report here instead of stdout
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Print the axis estimates as JSON
    Status,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum GripperArg {
    Open,
    Close,
    Cut,
}

impl From<GripperArg> for GripperAction {
    fn from(arg: GripperArg) -> Self {
        match arg {
            GripperArg::Open => GripperAction::Open,
            GripperArg::Close => GripperAction::Close,
            GripperArg::Cut => GripperAction::Cut,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DirectionArg {
    Extend,
    Retract,
}

impl From<DirectionArg> for LinearDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Extend => LinearDirection::Extend,
            DirectionArg::Retract => LinearDirection::Retract,
        }
    }
}

/// How a successful run ended.
enum Outcome {
    Completed,
    Interrupted,
}

fn main() {
    match run() {
        Ok(Outcome::Completed) => {}
        Ok(Outcome::Interrupted) => std::process::exit(130),
        Err(e) => {
            error!("herbot failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<Outcome, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_rig_config(args.config.as_deref());
    let level = config
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, level);
    let mut config = config?;

    info!(
        "Herbot v{} starting ({})",
        env!("CARGO_PKG_VERSION"),
        config.shared.service_name
    );

    if let Command::Manage {
        duration,
        z_min,
        z_max,
        z_step,
        r_extend,
        threshold,
        ..
    } = &args.command
    {
        apply_scan_overrides(
            &mut config,
            *duration,
            *z_min,
            *z_max,
            *z_step,
            *r_extend,
            *threshold,
        );
        config.validate()?;
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        info!("Received interrupt; stopping at the next safe point");
    })?;

    let clock: Arc<dyn Clock> = if args.virtual_time {
        if config.driver.name != simulation::DRIVER_NAME {
            warn!("--virtual-time with the '{}' driver skips real waits", config.driver.name);
        }
        Arc::new(ManualClock::new())
    } else {
        Arc::new(SystemClock::new())
    };

    let drivers = DriverRegistry::with_builtin().open(&config)?;
    let axes = RigAxes::build(&config, drivers, Arc::clone(&clock))?;
    let mut rig = MotionCoordinator::new(
        &config,
        axes,
        Collaborators::from_config(&config),
        clock,
        Box::new(TracingSink),
    );

    let outcome = execute(&args.command, &config, &mut rig, &cancel);
    rig.shutdown();
    let outcome = outcome?;

    if cancel.load(Ordering::SeqCst) {
        return Ok(Outcome::Interrupted);
    }
    info!("Herbot done");
    Ok(outcome)
}

fn execute(
    command: &Command,
    config: &RigConfig,
    rig: &mut MotionCoordinator,
    cancel: &AtomicBool,
) -> Result<Outcome, Box<dyn std::error::Error>> {
    match command {
        Command::Home => rig.home_all(),
        Command::Move {
            z,
            r,
            theta_s,
            ccw,
            z_speed,
        } => rig.move_to_position(MoveRequest {
            z_mm: *z,
            r_mm: *r,
            theta: theta_s.map(|s| TimedRotation {
                duration: seconds(s),
                rotation: Rotation::from_clockwise(!*ccw),
            }),
            z_frequency_hz: *z_speed,
        })?,
        Command::Scan {
            duration,
            speed,
            ccw,
        } => rig.scan_mode(seconds(*duration), Rotation::from_clockwise(!*ccw), *speed)?,
        Command::Approach { z, theta_s, r, cut } => rig.approach_leaf(ApproachRequest {
            z_mm: *z,
            theta_duration: seconds(*theta_s),
            r_mm: *r,
            cut: *cut,
        })?,
        Command::Gripper { action } => rig.gripper_action((*action).into()),
        Command::Actuator { direction, seconds: secs } => {
            rig.drive_actuator_raw((*direction).into(), seconds(*secs))
        }
        Command::Manage { report, .. } => {
            let orchestrator = ScanOrchestrator::new(config.scan.clone());
            return match orchestrator.run(rig, cancel) {
                Ok(scan) => {
                    write_report(&scan, report.as_deref())?;
                    Ok(Outcome::Completed)
                }
                Err(e) if e.is_interrupted() => {
                    write_report(&e.report, report.as_deref())?;
                    Ok(Outcome::Interrupted)
                }
                Err(e) => {
                    write_report(&e.report, report.as_deref())?;
                    Err(e.into())
                }
            };
        }
        Command::Status => println!("{}", serde_json::to_string_pretty(&rig.status())?),
    }
    Ok(Outcome::Completed)
}

fn apply_scan_overrides(
    config: &mut RigConfig,
    duration: Option<f64>,
    z_min: Option<i32>,
    z_max: Option<i32>,
    z_step: Option<u32>,
    r_extend: Option<f64>,
    threshold: Option<f64>,
) {
    let scan = &mut config.scan;
    if let Some(v) = duration {
        scan.duration_s = v;
    }
    if let Some(v) = z_min {
        scan.z_min_mm = v;
    }
    if let Some(v) = z_max {
        scan.z_max_mm = v;
    }
    if let Some(v) = z_step {
        scan.z_step_mm = v;
    }
    if let Some(v) = r_extend {
        scan.r_extend_mm = v;
    }
    if let Some(v) = threshold {
        scan.disease_threshold = v;
    }
}

fn write_report(
    report: &ScanReport,
    path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(report)?;
    match path {
        Some(path) => {
            std::fs::write(path, json)?;
            info!("Scan report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = directive.parse() {
        filter = filter.add_directive(directive);
    }

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
