//! Configuration loading traits and rig configuration types.
//!
//! All Herbot configuration lives in a single TOML file. Every section and
//! every field has a default, so an empty file describes the stock rig
//! (NEMA17 lift, 50 mm actuator, DC base, servo gripper).
//!
//! # Usage
//!
//! ```rust,no_run
//! use herbot_common::config::{ConfigLoader, ConfigError, RigConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = RigConfig::load(Path::new("herbot.toml"))?;
//!     config.validate()?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use crate::axis::Rotation;
use crate::consts::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about rig operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common fields shared by every Herbot binary.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "herbot-bench-01"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Rig instance identifier.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_service_name() -> String {
    "herbot".to_string()
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
///
/// Semantic validation is left to the caller (`RigConfig::validate`).
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

// ─── Rig Configuration ──────────────────────────────────────────────

/// Complete rig configuration (`herbot.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RigConfig {
    #[serde(default)]
    pub shared: SharedConfig,
    #[serde(default)]
    pub driver: DriverConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub z_axis: ZAxisConfig,
    #[serde(default)]
    pub r_axis: RAxisConfig,
    #[serde(default)]
    pub theta_axis: ThetaAxisConfig,
    #[serde(default)]
    pub gripper: GripperConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub classifiers: ClassifiersConfig,
}

impl RigConfig {
    /// Validate every section plus the cross-section constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        if self.driver.name.is_empty() {
            return Err(invalid("driver.name cannot be empty"));
        }
        self.z_axis.validate()?;
        self.r_axis.validate()?;
        self.theta_axis.validate()?;
        self.gripper.validate()?;
        self.motion.validate()?;
        self.scan.validate()?;
        self.capture.validate()?;

        let z_max = self.z_axis.calibration.max_position_mm;
        if f64::from(self.scan.z_max_mm) > z_max {
            return Err(invalid(format!(
                "scan.z_max_mm ({}) exceeds calibrated Z travel ({z_max})",
                self.scan.z_max_mm
            )));
        }
        if self.scan.r_extend_mm > self.r_axis.stroke_mm {
            return Err(invalid(format!(
                "scan.r_extend_mm ({}) exceeds R stroke ({})",
                self.scan.r_extend_mm, self.r_axis.stroke_mm
            )));
        }
        Ok(())
    }

    /// Path of the Z axis state record.
    pub fn z_state_path(&self) -> PathBuf {
        self.state.dir.join(Z_STATE_FILE)
    }

    /// Path of the R axis state record.
    pub fn r_state_path(&self) -> PathBuf {
        self.state.dir.join(R_STATE_FILE)
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(msg.into())
}

fn require_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be > 0 (got {value})")))
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be >= 0 (got {value})")))
    }
}

fn require_percent(name: &str, value: u8) -> Result<(), ConfigError> {
    if value <= 100 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be within 0..=100 (got {value})")))
    }
}

fn require_unit_interval(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be within [0, 1] (got {value})")))
    }
}

/// Which actuator driver backs the rig.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Registered driver name.
    #[serde(default = "default_driver_name")]
    pub name: String,
}

fn default_driver_name() -> String {
    "simulation".to_string()
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            name: default_driver_name(),
        }
    }
}

/// Where the per-axis state records live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    #[serde(default = "default_state_dir")]
    pub dir: PathBuf,
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_DIR)
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            dir: default_state_dir(),
        }
    }
}

// ─── Signal lines ───────────────────────────────────────────────────

/// Step/direction driver lines (BCM numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepLines {
    pub enable: u8,
    pub step: u8,
    pub dir: u8,
}

impl Default for StepLines {
    fn default() -> Self {
        Self {
            enable: 2,
            step: 3,
            dir: 4,
        }
    }
}

/// H-bridge driver lines (BCM numbering) and PWM carrier frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HBridgeLines {
    pub enable: u8,
    pub in1: u8,
    pub in2: u8,
    pub stby: u8,
    #[serde(default = "default_hbridge_pwm_hz")]
    pub pwm_hz: u32,
}

fn default_hbridge_pwm_hz() -> u32 {
    1000
}

/// Servo signal line (BCM numbering) and PWM frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServoLine {
    pub pin: u8,
    #[serde(default = "default_servo_pwm_hz")]
    pub pwm_hz: u32,
}

fn default_servo_pwm_hz() -> u32 {
    50
}

impl Default for ServoLine {
    fn default() -> Self {
        Self {
            pin: 13,
            pwm_hz: default_servo_pwm_hz(),
        }
    }
}

// ─── Axes ───────────────────────────────────────────────────────────

/// Z axis calibration record. Immutable for a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    #[serde(alias = "stepsPerMm")]
    pub steps_per_mm: f64,
    #[serde(alias = "maxPositionMm")]
    pub max_position_mm: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            steps_per_mm: DEFAULT_STEPS_PER_MM,
            max_position_mm: DEFAULT_Z_MAX_MM,
        }
    }
}

impl Calibration {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("z_axis.calibration.steps_per_mm", self.steps_per_mm)?;
        require_positive("z_axis.calibration.max_position_mm", self.max_position_mm)
    }
}

/// Stepper lift configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZAxisConfig {
    #[serde(default)]
    pub calibration: Calibration,
    /// Step frequency for ordinary moves [Hz].
    #[serde(default = "default_z_frequency")]
    pub frequency_hz: f64,
    /// Step frequency while homing [Hz].
    #[serde(default = "default_z_homing_frequency")]
    pub homing_frequency_hz: f64,
    #[serde(default)]
    pub lines: StepLines,
}

fn default_z_frequency() -> f64 {
    DEFAULT_Z_FREQUENCY_HZ
}
fn default_z_homing_frequency() -> f64 {
    DEFAULT_Z_HOMING_FREQUENCY_HZ
}

impl Default for ZAxisConfig {
    fn default() -> Self {
        Self {
            calibration: Calibration::default(),
            frequency_hz: DEFAULT_Z_FREQUENCY_HZ,
            homing_frequency_hz: DEFAULT_Z_HOMING_FREQUENCY_HZ,
            lines: StepLines::default(),
        }
    }
}

impl ZAxisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.calibration.validate()?;
        require_positive("z_axis.frequency_hz", self.frequency_hz)?;
        require_positive("z_axis.homing_frequency_hz", self.homing_frequency_hz)
    }
}

/// Linear actuator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RAxisConfig {
    #[serde(default = "default_r_stroke")]
    pub stroke_mm: f64,
    /// Calibrated travel speed at full duty [mm/s].
    #[serde(default = "default_r_speed")]
    pub speed_mm_s: f64,
    /// Retract time that always reaches the mechanical end [s].
    #[serde(default = "default_r_home_time")]
    pub home_time_s: f64,
    #[serde(default = "default_r_lines")]
    pub lines: HBridgeLines,
}

fn default_r_stroke() -> f64 {
    DEFAULT_R_STROKE_MM
}
fn default_r_speed() -> f64 {
    DEFAULT_R_SPEED_MM_S
}
fn default_r_home_time() -> f64 {
    DEFAULT_R_HOME_TIME_S
}
fn default_r_lines() -> HBridgeLines {
    HBridgeLines {
        enable: 12,
        in1: 18,
        in2: 15,
        stby: 23,
        pwm_hz: default_hbridge_pwm_hz(),
    }
}

impl Default for RAxisConfig {
    fn default() -> Self {
        Self {
            stroke_mm: DEFAULT_R_STROKE_MM,
            speed_mm_s: DEFAULT_R_SPEED_MM_S,
            home_time_s: DEFAULT_R_HOME_TIME_S,
            lines: default_r_lines(),
        }
    }
}

impl RAxisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("r_axis.stroke_mm", self.stroke_mm)?;
        require_positive("r_axis.speed_mm_s", self.speed_mm_s)?;
        require_non_negative("r_axis.home_time_s", self.home_time_s)
    }
}

/// Rotary base configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThetaAxisConfig {
    /// Duty for timed rotations [%].
    #[serde(default = "default_theta_speed")]
    pub speed_percent: u8,
    #[serde(default = "default_theta_lines")]
    pub lines: HBridgeLines,
}

fn default_theta_speed() -> u8 {
    DEFAULT_THETA_SPEED_PERCENT
}
fn default_theta_lines() -> HBridgeLines {
    HBridgeLines {
        enable: 25,
        in1: 7,
        in2: 8,
        stby: 1,
        pwm_hz: default_hbridge_pwm_hz(),
    }
}

impl Default for ThetaAxisConfig {
    fn default() -> Self {
        Self {
            speed_percent: DEFAULT_THETA_SPEED_PERCENT,
            lines: default_theta_lines(),
        }
    }
}

impl ThetaAxisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_percent("theta_axis.speed_percent", self.speed_percent)
    }
}

/// Servo gripper calibration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GripperConfig {
    #[serde(default = "default_open_deg")]
    pub open_deg: f64,
    #[serde(default = "default_close_deg")]
    pub close_deg: f64,
    /// Hold time for open/close commands [s].
    #[serde(default = "default_hold")]
    pub hold_s: f64,
    #[serde(default)]
    pub line: ServoLine,
}

fn default_open_deg() -> f64 {
    DEFAULT_GRIPPER_OPEN_DEG
}
fn default_close_deg() -> f64 {
    DEFAULT_GRIPPER_CLOSE_DEG
}
fn default_hold() -> f64 {
    DEFAULT_GRIPPER_HOLD_S
}

impl Default for GripperConfig {
    fn default() -> Self {
        Self {
            open_deg: DEFAULT_GRIPPER_OPEN_DEG,
            close_deg: DEFAULT_GRIPPER_CLOSE_DEG,
            hold_s: DEFAULT_GRIPPER_HOLD_S,
            line: ServoLine::default(),
        }
    }
}

impl GripperConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, angle) in [
            ("gripper.open_deg", self.open_deg),
            ("gripper.close_deg", self.close_deg),
        ] {
            if !(0.0..=SERVO_MAX_DEG).contains(&angle) {
                return Err(invalid(format!(
                    "{name} must be within [0, {SERVO_MAX_DEG}] (got {angle})"
                )));
            }
        }
        require_non_negative("gripper.hold_s", self.hold_s)
    }
}

// ─── Coordinator ────────────────────────────────────────────────────

/// Settle delays and parameters of the composite moves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Pause between axes while homing [s].
    #[serde(default = "default_home_settle")]
    pub home_settle_s: f64,
    /// Pause after each axis of a composite move [s].
    #[serde(default = "default_move_settle")]
    pub move_settle_s: f64,
    /// Pause after opening the gripper before an approach [s].
    #[serde(default = "default_move_settle")]
    pub approach_open_settle_s: f64,
    /// Pause after each approach step [s].
    #[serde(default = "default_home_settle")]
    pub approach_settle_s: f64,
    /// Z step frequency during an approach [Hz].
    #[serde(default = "default_z_homing_frequency")]
    pub approach_z_frequency_hz: f64,
    /// Close-and-hold time of an approach cut [s].
    #[serde(default = "default_cut_time")]
    pub cut_time_s: f64,
}

fn default_home_settle() -> f64 {
    0.5
}
fn default_move_settle() -> f64 {
    0.3
}
fn default_cut_time() -> f64 {
    DEFAULT_CUT_TIME_S
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            home_settle_s: default_home_settle(),
            move_settle_s: default_move_settle(),
            approach_open_settle_s: default_move_settle(),
            approach_settle_s: default_home_settle(),
            approach_z_frequency_hz: DEFAULT_Z_HOMING_FREQUENCY_HZ,
            cut_time_s: DEFAULT_CUT_TIME_S,
        }
    }
}

impl MotionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_negative("motion.home_settle_s", self.home_settle_s)?;
        require_non_negative("motion.move_settle_s", self.move_settle_s)?;
        require_non_negative("motion.approach_open_settle_s", self.approach_open_settle_s)?;
        require_non_negative("motion.approach_settle_s", self.approach_settle_s)?;
        require_positive("motion.approach_z_frequency_hz", self.approach_z_frequency_hz)?;
        require_non_negative("motion.cut_time_s", self.cut_time_s)
    }
}

// ─── Scan ───────────────────────────────────────────────────────────

/// Scan-and-manage parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Wall-clock budget of the scan [s].
    #[serde(default = "default_scan_duration")]
    pub duration_s: f64,
    #[serde(default)]
    pub z_min_mm: i32,
    #[serde(default = "default_z_max_scan")]
    pub z_max_mm: i32,
    #[serde(default = "default_z_step")]
    pub z_step_mm: u32,
    #[serde(default = "default_z_frequency")]
    pub z_frequency_hz: f64,
    /// R reach used to remove a diseased leaf [mm].
    #[serde(default = "default_r_extend")]
    pub r_extend_mm: f64,
    /// Continuous rotation duty while scanning [%].
    #[serde(default = "default_scan_speed")]
    pub theta_speed_percent: u8,
    #[serde(default)]
    pub rotation: Rotation,
    /// Confidence at or above which a non-healthy label counts as diseased.
    #[serde(default = "default_threshold")]
    pub disease_threshold: f64,
    /// Confidence below which the top label is ignored.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    #[serde(default = "default_herb_top_k")]
    pub herb_top_k: usize,
    #[serde(default = "default_disease_top_k")]
    pub disease_top_k: usize,
    /// Pause after the PREPARE retract [s].
    #[serde(default = "default_home_settle")]
    pub prepare_settle_s: f64,
    /// Stabilization pause at each Z stop [s].
    #[serde(default = "default_stop_settle")]
    pub stop_settle_s: f64,
    /// Pause after stopping the base and after opening the gripper [s].
    #[serde(default = "default_short_pause")]
    pub removal_pause_s: f64,
    /// Pause after extending, cutting and retracting [s].
    #[serde(default = "default_move_settle")]
    pub removal_settle_s: f64,
    #[serde(default = "default_cut_time")]
    pub cut_time_s: f64,
}

fn default_scan_duration() -> f64 {
    60.0
}
fn default_z_max_scan() -> i32 {
    700
}
fn default_z_step() -> u32 {
    100
}
fn default_r_extend() -> f64 {
    30.0
}
fn default_scan_speed() -> u8 {
    DEFAULT_THETA_SCAN_SPEED_PERCENT
}
fn default_threshold() -> f64 {
    0.6
}
fn default_min_confidence() -> f64 {
    0.4
}
fn default_herb_top_k() -> usize {
    1
}
fn default_disease_top_k() -> usize {
    3
}
fn default_stop_settle() -> f64 {
    0.1
}
fn default_short_pause() -> f64 {
    0.2
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            duration_s: default_scan_duration(),
            z_min_mm: 0,
            z_max_mm: default_z_max_scan(),
            z_step_mm: default_z_step(),
            z_frequency_hz: DEFAULT_Z_FREQUENCY_HZ,
            r_extend_mm: default_r_extend(),
            theta_speed_percent: DEFAULT_THETA_SCAN_SPEED_PERCENT,
            rotation: Rotation::Clockwise,
            disease_threshold: default_threshold(),
            min_confidence: default_min_confidence(),
            herb_top_k: default_herb_top_k(),
            disease_top_k: default_disease_top_k(),
            prepare_settle_s: default_home_settle(),
            stop_settle_s: default_stop_settle(),
            removal_pause_s: default_short_pause(),
            removal_settle_s: default_move_settle(),
            cut_time_s: DEFAULT_CUT_TIME_S,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_negative("scan.duration_s", self.duration_s)?;
        if self.z_min_mm < 0 {
            return Err(invalid(format!(
                "scan.z_min_mm must be >= 0 (got {})",
                self.z_min_mm
            )));
        }
        if self.z_max_mm < self.z_min_mm {
            return Err(invalid(format!(
                "scan.z_max_mm ({}) must be >= scan.z_min_mm ({})",
                self.z_max_mm, self.z_min_mm
            )));
        }
        if self.z_step_mm == 0 {
            return Err(invalid("scan.z_step_mm must be > 0"));
        }
        require_positive("scan.z_frequency_hz", self.z_frequency_hz)?;
        require_non_negative("scan.r_extend_mm", self.r_extend_mm)?;
        require_percent("scan.theta_speed_percent", self.theta_speed_percent)?;
        require_unit_interval("scan.disease_threshold", self.disease_threshold)?;
        require_unit_interval("scan.min_confidence", self.min_confidence)?;
        if self.herb_top_k == 0 || self.disease_top_k == 0 {
            return Err(invalid("scan.herb_top_k and scan.disease_top_k must be > 0"));
        }
        require_non_negative("scan.prepare_settle_s", self.prepare_settle_s)?;
        require_non_negative("scan.stop_settle_s", self.stop_settle_s)?;
        require_non_negative("scan.removal_pause_s", self.removal_pause_s)?;
        require_non_negative("scan.removal_settle_s", self.removal_settle_s)?;
        require_non_negative("scan.cut_time_s", self.cut_time_s)
    }
}

// ─── Collaborators ──────────────────────────────────────────────────

/// Still-image capture command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "default_capture_program")]
    pub program: PathBuf,
    #[serde(default = "default_capture_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_capture_width")]
    pub width: u32,
    #[serde(default = "default_capture_height")]
    pub height: u32,
    /// Camera-side exposure timeout passed to the program [ms].
    #[serde(default = "default_shutter_ms")]
    pub shutter_ms: u32,
    /// Upper bound on the whole capture call [s].
    #[serde(default = "default_capture_timeout")]
    pub timeout_s: f64,
}

fn default_capture_program() -> PathBuf {
    PathBuf::from("libcamera-still")
}
fn default_capture_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CAPTURE_DIR)
}
fn default_capture_width() -> u32 {
    640
}
fn default_capture_height() -> u32 {
    480
}
fn default_shutter_ms() -> u32 {
    100
}
fn default_capture_timeout() -> f64 {
    5.0
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            program: default_capture_program(),
            output_dir: default_capture_dir(),
            width: default_capture_width(),
            height: default_capture_height(),
            shutter_ms: default_shutter_ms(),
            timeout_s: default_capture_timeout(),
        }
    }
}

impl CaptureConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(invalid("capture.width and capture.height must be > 0"));
        }
        require_positive("capture.timeout_s", self.timeout_s)
    }
}

/// An external inference program and the label set it was trained on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    /// JSON file: `{ "class_names": [...], "num_classes": n }`.
    pub class_names: PathBuf,
}

/// Both classifiers are optional; an absent section leaves that capability
/// unavailable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifiersConfig {
    #[serde(default)]
    pub herb: Option<ClassifierConfig>,
    #[serde(default)]
    pub disease: Option<ClassifierConfig>,
}
