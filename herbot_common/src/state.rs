//! Persisted per-axis position record.
//!
//! Z and R each keep one small JSON file so a restart knows where the axis
//! was left and whether that position can be trusted:
//!
//! ```json
//! { "position": 1281, "isHomed": true }
//! ```
//!
//! Z stores its position in steps, R in millimetres. Reads are lenient: a
//! missing or corrupt record yields the unhomed default, never an error the
//! caller has to handle.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failure while writing or reading a state record.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("state I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("state record {path} is malformed: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Last commanded position of an axis and whether it is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisPosition {
    /// Steps (Z) or millimetres (R).
    pub position: f64,
    /// `true` only after a successful home.
    pub is_homed: bool,
}

impl AxisPosition {
    pub const fn new(position: f64, is_homed: bool) -> Self {
        Self {
            position,
            is_homed,
        }
    }

    /// Position zero, trusted. What a completed home leaves behind.
    pub const fn homed_origin() -> Self {
        Self::new(0.0, true)
    }
}

/// File store for one [`AxisPosition`] record.
#[derive(Debug, Clone)]
pub struct StatePersistence {
    path: PathBuf,
}

impl StatePersistence {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the record, creating parent directories when needed.
    pub fn save(&self, record: &AxisPosition) -> Result<(), StateError> {
        debug!("Saving axis state to {:?}", self.path);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let file = File::create(&self.path).map_err(|source| self.io_error(source))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, record).map_err(|source| StateError::Format {
            path: self.path.clone(),
            source,
        })?;
        writer.flush().map_err(|source| self.io_error(source))?;
        Ok(())
    }

    /// Read the record. `Ok(None)` when the file does not exist.
    pub fn try_load(&self) -> Result<Option<AxisPosition>, StateError> {
        if !self.path.exists() {
            debug!("State file {:?} does not exist", self.path);
            return Ok(None);
        }

        let file = File::open(&self.path).map_err(|source| self.io_error(source))?;
        let record = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            StateError::Format {
                path: self.path.clone(),
                source,
            }
        })?;
        Ok(Some(record))
    }

    /// Read the record, falling back to the unhomed default on any failure.
    pub fn load_or_default(&self) -> AxisPosition {
        match self.try_load() {
            Ok(Some(record)) => {
                info!(
                    "Loaded axis state from {:?}: position={}, homed={}",
                    self.path, record.position, record.is_homed
                );
                record
            }
            Ok(None) => AxisPosition::default(),
            Err(e) => {
                warn!("{e}; starting unhomed at 0");
                AxisPosition::default()
            }
        }
    }

    /// Write the record, logging instead of failing.
    pub fn save_or_warn(&self, record: &AxisPosition) {
        if let Err(e) = self.save(record) {
            warn!("Could not persist axis state: {e}");
        }
    }

    fn io_error(&self, source: std::io::Error) -> StateError {
        StateError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
