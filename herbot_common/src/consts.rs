//! Rig-wide constants for the Herbot workspace.
//!
//! Single source of truth for calibration defaults, settle delays and
//! default file locations. Configuration defaults are built from these.

// ─── Z axis (stepper lift) ──────────────────────────────────────────

/// Default Z calibration: steps per millimetre of carriage travel.
pub const DEFAULT_STEPS_PER_MM: f64 = 4.27;

/// Default Z calibration: mechanical travel in millimetres.
pub const DEFAULT_Z_MAX_MM: f64 = 750.0;

/// Default step frequency for Z moves [Hz].
pub const DEFAULT_Z_FREQUENCY_HZ: f64 = 1000.0;

/// Step frequency used while homing Z [Hz].
pub const DEFAULT_Z_HOMING_FREQUENCY_HZ: f64 = 800.0;

// ─── R axis (linear actuator) ───────────────────────────────────────

/// Default stroke of the radial actuator [mm].
pub const DEFAULT_R_STROKE_MM: f64 = 50.0;

/// Default travel speed of the radial actuator [mm/s].
pub const DEFAULT_R_SPEED_MM_S: f64 = 10.0;

/// Default full-retract time used to home R [s].
pub const DEFAULT_R_HOME_TIME_S: f64 = 6.0;

// ─── Θ axis (DC rotary base) ────────────────────────────────────────

/// Duty used for timed rotations when no speed is given [%].
pub const DEFAULT_THETA_SPEED_PERCENT: u8 = 100;

/// Duty used for slow scanning rotation [%].
pub const DEFAULT_THETA_SCAN_SPEED_PERCENT: u8 = 3;

/// Default duration of the rotate-only scan mode [s].
pub const DEFAULT_SCAN_MODE_DURATION_S: f64 = 60.0;

// ─── Gripper (servo) ────────────────────────────────────────────────

/// Servo angle of the fully open gripper [deg].
pub const DEFAULT_GRIPPER_OPEN_DEG: f64 = 90.0;

/// Servo angle of the fully closed gripper [deg].
pub const DEFAULT_GRIPPER_CLOSE_DEG: f64 = 0.0;

/// Default hold time for open/close [s].
pub const DEFAULT_GRIPPER_HOLD_S: f64 = 0.5;

/// Forced-open hold at the start of every cut [s].
pub const CUT_OPEN_HOLD_S: f64 = 0.3;

/// Default close-and-hold time of a cut [s].
pub const DEFAULT_CUT_TIME_S: f64 = 1.5;

/// Servo angle range accepted by the gripper [deg].
pub const SERVO_MAX_DEG: f64 = 180.0;

// ─── Files ──────────────────────────────────────────────────────────

/// Default directory holding the per-axis state records.
pub const DEFAULT_STATE_DIR: &str = ".";

/// Z axis state record file name.
pub const Z_STATE_FILE: &str = "stepper_state.json";

/// R axis state record file name.
pub const R_STATE_FILE: &str = "actuator_state.json";

/// Default directory for captured images.
pub const DEFAULT_CAPTURE_DIR: &str = "captures";

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "herbot.toml";
