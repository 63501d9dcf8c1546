//! Herbot Common Library
//!
//! Shared constants, configuration types and the persisted axis record used
//! by every crate in the Herbot workspace.
//!
//! # Module Structure
//!
//! - [`axis`] - Axis identifiers and direction types
//! - [`config`] - Configuration loading trait, shared and rig configuration types
//! - [`consts`] - Calibration defaults, timing defaults and file names
//! - [`state`] - Persisted per-axis position record and its file store
//! - [`timing`] - The `Clock` wait seam (real and manual clocks)
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use herbot_common::config::{ConfigLoader, RigConfig};
//! use herbot_common::state::AxisPosition;
//! ```

pub mod axis;
pub mod config;
pub mod consts;
pub mod prelude;
pub mod state;
pub mod timing;
