//! Scan-and-manage.

mod orchestrator;
mod phase;
mod plan;
mod report;

pub use orchestrator::ScanOrchestrator;
pub use phase::ScanPhase;
pub use plan::{SweepDirection, SweepPlan};
pub use report::{ScanRecord, ScanReport};

use crate::coordinator::MotionError;
use herbot_hal::AxisError;
use thiserror::Error;

/// Why a scan stopped early.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanAbort {
    #[error(transparent)]
    Motion(#[from] MotionError),

    #[error("scan interrupted")]
    Interrupted,
}

impl From<AxisError> for ScanAbort {
    fn from(e: AxisError) -> Self {
        Self::Motion(e.into())
    }
}

/// A failed scan, with everything recorded before the failure.
#[derive(Debug, Error)]
#[error("scan aborted after {} images: {cause}", report.total_images)]
pub struct ScanError {
    pub cause: ScanAbort,
    pub report: ScanReport,
}

impl ScanError {
    pub fn is_interrupted(&self) -> bool {
        matches!(self.cause, ScanAbort::Interrupted)
    }
}
