//! In-memory scan results.

use crate::coordinator::Observation;
use crate::disease::UNKNOWN_LABEL;
use serde::Serialize;
use std::path::PathBuf;

/// One visited stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub scan_id: u32,
    pub z_mm: i32,
    /// Seconds since the sweep started, taken before the capture.
    #[serde(rename = "elapsedSeconds")]
    pub elapsed_s: f64,
    #[serde(rename = "imagePath")]
    pub image: Option<PathBuf>,
    #[serde(rename = "herbLabel")]
    pub herb_name: String,
    pub herb_confidence: f64,
    #[serde(rename = "diseaseLabel")]
    pub disease_class: String,
    pub disease_confidence: f64,
    pub inference_ms: f64,
    #[serde(rename = "isDiseased")]
    pub diseased: bool,
}

impl ScanRecord {
    pub fn from_observation(
        scan_id: u32,
        z_mm: i32,
        elapsed_s: f64,
        observation: Observation,
    ) -> Self {
        let (herb_name, herb_confidence) = match observation.herb {
            Some(top) => (top.label, top.confidence),
            None => (UNKNOWN_LABEL.to_string(), 0.0),
        };
        Self {
            scan_id,
            z_mm,
            elapsed_s,
            image: observation.image,
            herb_name,
            herb_confidence,
            disease_class: observation.verdict.label,
            disease_confidence: observation.verdict.confidence,
            inference_ms: observation.verdict.inference_ms,
            diseased: observation.verdict.is_diseased,
        }
    }
}

/// Counters plus the ordered stop records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub total_images: u32,
    pub diseased_detected: u32,
    pub cuts_performed: u32,
    /// Sweep time, excluding PREPARE and FINALIZE [s].
    #[serde(rename = "elapsedSeconds")]
    pub duration_s: f64,
    pub records: Vec<ScanRecord>,
}

impl ScanReport {
    pub fn summary(&self) -> String {
        format!(
            "{} images, {} diseased, {} cuts in {:.1} s",
            self.total_images, self.diseased_detected, self.cuts_performed, self.duration_s
        )
    }
}
