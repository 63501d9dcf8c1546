//! # Herbot Control Library
//!
//! Everything above the hardware layer: the motion coordinator that
//! sequences the four axes into composite moves, the time-boxed
//! scan-and-manage orchestrator, the disease-verdict policy and the
//! capture/classifier collaborators.
//!
//! ## Layers
//!
//! 1. **Axes** (`herbot_hal`): Z stepper, R actuator, Θ base, gripper
//! 2. **MotionCoordinator**: homing, composite moves, classification
//! 3. **ScanOrchestrator**: PREPARE → SWEEPING → … → FINALIZE
//!
//! All work runs on one control thread. The only overlap is Θ's
//! continuous drive, which keeps turning while a stop is imaged.

pub mod collab;
pub mod config;
pub mod coordinator;
pub mod disease;
pub mod event;
pub mod scan;

pub use coordinator::{
    ApproachRequest, MotionCoordinator, MotionError, MoveRequest, RigStatus, TimedRotation,
};
pub use event::{EventSink, RigEvent};
pub use scan::{ScanError, ScanOrchestrator, ScanReport};
