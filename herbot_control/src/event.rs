//! Rig event channel.
//!
//! Every completed action is published as a [`RigEvent`]. Sinks decide what
//! to do with it: log it, forward it over a channel, or keep it for a test.

use crate::disease::DiseaseVerdict;
use crate::scan::ScanPhase;
use herbot_common::axis::{AxisId, LinearDirection, Rotation};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Duration;
use tracing::info;

/// Gripper command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GripperAction {
    Open,
    Close,
    Cut,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RigEvent {
    AxisHomed(AxisId),
    HomingComplete,
    PositionReached {
        z_mm: Option<f64>,
        r_mm: Option<f64>,
        rotated: Option<(Rotation, Duration)>,
    },
    ApproachComplete {
        cut: bool,
    },
    ScanRotationComplete(Duration),
    Gripper(GripperAction),
    ActuatorDriven {
        direction: LinearDirection,
        duration: Duration,
    },
    ScanPhase(ScanPhase),
    ImageCaptured {
        scan_id: u32,
        z_mm: i32,
        image: Option<PathBuf>,
    },
    StopClassified {
        scan_id: u32,
        herb: Option<String>,
        verdict: DiseaseVerdict,
    },
    LeafRemoved {
        scan_id: u32,
    },
    ScanFinalized,
    Shutdown,
}

/// Destination for rig events.
pub trait EventSink: Send {
    fn emit(&mut self, event: RigEvent);
}

/// Mirrors events into the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: RigEvent) {
        match &event {
            RigEvent::ImageCaptured {
                scan_id,
                z_mm,
                image,
            } => info!(scan_id, z_mm, image = ?image, "image captured"),
            RigEvent::StopClassified {
                scan_id,
                herb,
                verdict,
            } => info!(
                scan_id,
                herb = herb.as_deref().unwrap_or("Unknown"),
                disease = %verdict.label,
                confidence = verdict.confidence,
                diseased = verdict.is_diseased,
                "stop classified"
            ),
            other => info!(event = ?other, "rig event"),
        }
    }
}

/// Forwards events to a channel. A closed receiver is ignored.
impl EventSink for Sender<RigEvent> {
    fn emit(&mut self, event: RigEvent) {
        let _ = self.send(event);
    }
}

/// Keeps every event; clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    events: Arc<Mutex<Vec<RigEvent>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RigEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&RigEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }
}

impl EventSink for CollectingSink {
    fn emit(&mut self, event: RigEvent) {
        self.events.lock().push(event);
    }
}
