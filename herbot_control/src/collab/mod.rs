//! External collaborators: image capture and the two classifiers.
//!
//! The control path only sees the traits here. Neither trait lets a failure
//! escape into the scan: capture answers `None`, and the coordinator maps
//! classifier errors to sentinel results.

mod capture;
mod classifier;

pub use capture::LibcameraCapture;
pub use classifier::{ClassNames, CommandClassifier};

use herbot_common::config::{ClassifierConfig, RigConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Classifier construction or invocation failure.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("{0} classifier is not configured")]
    NotConfigured(&'static str),

    #[error("failed to load class names from {path}: {reason}")]
    ClassNames { path: PathBuf, reason: String },

    #[error("inference program {0} not found")]
    ProgramNotFound(PathBuf),

    #[error("inference failed: {0}")]
    Invocation(String),

    #[error("unexpected inference output: {0}")]
    Output(String),
}

/// One ranked label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
}

/// Ranked labels, best first, plus inference latency.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predictions {
    pub ranked: Vec<Prediction>,
    pub latency_ms: f64,
}

impl Predictions {
    pub fn top(&self) -> Option<&Prediction> {
        self.ranked.first()
    }
}

/// Black-box image classifier.
pub trait Classifier: Send {
    fn name(&self) -> &str;

    /// Rank the top `top_k` labels for `image`. `None` yields an empty
    /// ranking, never an error.
    fn predict(&mut self, image: Option<&Path>, top_k: usize)
    -> Result<Predictions, ClassifierError>;
}

/// Still-image capture. Every failure surfaces as `None`.
pub trait ImageCapture: Send {
    fn capture(&mut self, scan_id: u32, z_mm: i32) -> Option<PathBuf>;
}

/// An optional capability, with the reason when it is missing.
pub enum Capability<T> {
    Available(T),
    Unavailable(String),
}

impl<T> Capability<T> {
    /// Keep a constructed handle, or log and record why construction failed.
    pub fn from_result<E: fmt::Display>(what: &str, result: Result<T, E>) -> Self {
        match result {
            Ok(handle) => {
                info!("{what} available");
                Self::Available(handle)
            }
            Err(e) => {
                warn!("{what} unavailable, continuing without it: {e}");
                Self::Unavailable(e.to_string())
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Available(handle) => Some(handle),
            Self::Unavailable(_) => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            Self::Available(_) => None,
            Self::Unavailable(reason) => Some(reason),
        }
    }
}

impl<T> fmt::Debug for Capability<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(_) => f.write_str("Available"),
            Self::Unavailable(reason) => f.debug_tuple("Unavailable").field(reason).finish(),
        }
    }
}

/// Deferred classifier construction, run once by the coordinator.
pub type ClassifierFactory =
    Box<dyn FnOnce() -> Result<Box<dyn Classifier>, ClassifierError> + Send>;

/// Everything the coordinator needs from outside the rig.
pub struct Collaborators {
    pub capture: Box<dyn ImageCapture>,
    pub herb: ClassifierFactory,
    pub disease: ClassifierFactory,
}

impl Collaborators {
    /// Process-backed collaborators described by the rig configuration.
    pub fn from_config(config: &RigConfig) -> Self {
        Self {
            capture: Box::new(LibcameraCapture::new(config.capture.clone())),
            herb: command_factory("herb", config.classifiers.herb.clone()),
            disease: command_factory("disease", config.classifiers.disease.clone()),
        }
    }
}

fn command_factory(role: &'static str, config: Option<ClassifierConfig>) -> ClassifierFactory {
    Box::new(move || {
        let config = config.ok_or(ClassifierError::NotConfigured(role))?;
        let classifier = CommandClassifier::new(role, &config)?;
        Ok(Box::new(classifier) as Box<dyn Classifier>)
    })
}
