//! Axis identifiers and logical motion directions.
//!
//! Every actuator on the rig moves in one of two senses. Each axis gets its
//! own direction type so a lift direction can never be handed to the
//! rotary base by mistake.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three positioning axes of the cylindrical rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisId {
    /// Vertical lift (stepper, belt-driven carriage).
    Z,
    /// Radial reach (linear actuator on the carriage).
    R,
    /// Rotational base (DC motor under the pot).
    Theta,
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Z => f.write_str("Z"),
            Self::R => f.write_str("R"),
            Self::Theta => f.write_str("θ"),
        }
    }
}

/// Direction of the radial actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinearDirection {
    /// Away from the carriage, towards the plant.
    Extend,
    /// Back towards the mechanical end stop.
    Retract,
}

/// Direction of the rotary base, seen from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    /// Clockwise.
    #[default]
    Clockwise,
    /// Counter-clockwise.
    CounterClockwise,
}

impl Rotation {
    /// Build from a "clockwise?" flag.
    #[inline]
    pub const fn from_clockwise(clockwise: bool) -> Self {
        if clockwise {
            Self::Clockwise
        } else {
            Self::CounterClockwise
        }
    }

    /// Short label used in logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Clockwise => "CW",
            Self::CounterClockwise => "CCW",
        }
    }
}
