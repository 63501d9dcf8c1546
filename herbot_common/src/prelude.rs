//! Prelude module for common re-exports.
//!
//! ```rust
//! use herbot_common::prelude::*;
//! ```

// ─── Axes ───────────────────────────────────────────────────────────
pub use crate::axis::{AxisId, LinearDirection, Rotation};

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, RigConfig, SharedConfig};

// ─── State ──────────────────────────────────────────────────────────
pub use crate::state::{AxisPosition, StatePersistence};

// ─── Timing ─────────────────────────────────────────────────────────
pub use crate::timing::{Clock, ManualClock, SystemClock, seconds};
