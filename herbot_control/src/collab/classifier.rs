//! Classifier backed by an external inference program.
//!
//! The program is invoked once per image as
//! `<program> <args..> --image <path> --top-k <k>` and must print
//!
//! ```json
//! { "predictions": [ { "label": "Basil", "confidence": 0.93 } ], "inference_ms": 41.7 }
//! ```
//!
//! Calls have no timeout. A hung program blocks the rig.

use super::{Classifier, ClassifierError, Prediction, Predictions};
use herbot_common::config::ClassifierConfig;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, info};

/// Label set a model was trained on.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassNames {
    pub class_names: Vec<String>,
    pub num_classes: usize,
}

impl ClassNames {
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let fail = |reason: String| ClassifierError::ClassNames {
            path: path.to_path_buf(),
            reason,
        };
        let text = fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
        let names: Self = serde_json::from_str(&text).map_err(|e| fail(e.to_string()))?;
        if names.class_names.len() != names.num_classes {
            return Err(fail(format!(
                "num_classes is {} but {} names are listed",
                names.num_classes,
                names.class_names.len()
            )));
        }
        Ok(names)
    }
}

#[derive(Debug, Deserialize)]
struct InferenceOutput {
    predictions: Vec<Prediction>,
    #[serde(default)]
    inference_ms: Option<f64>,
}

pub struct CommandClassifier {
    role: String,
    program: PathBuf,
    args: Vec<String>,
    known: HashSet<String>,
}

impl CommandClassifier {
    /// Load the class names and locate the program.
    pub fn new(role: &str, config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let names = ClassNames::load(&config.class_names)?;
        let program = resolve_program(&config.program)
            .ok_or_else(|| ClassifierError::ProgramNotFound(config.program.clone()))?;
        info!(
            "Loaded {} {role} classes; inference via {:?}",
            names.num_classes, program
        );
        Ok(Self {
            role: role.to_string(),
            program,
            args: config.args.clone(),
            known: names.class_names.into_iter().collect(),
        })
    }

    fn parse(&self, stdout: &[u8], top_k: usize) -> Result<InferenceOutput, ClassifierError> {
        let mut output: InferenceOutput =
            serde_json::from_slice(stdout).map_err(|e| ClassifierError::Output(e.to_string()))?;
        if let Some(unknown) = output
            .predictions
            .iter()
            .find(|p| !self.known.contains(&p.label))
        {
            return Err(ClassifierError::Output(format!(
                "label {:?} is not a known {} class",
                unknown.label, self.role
            )));
        }
        output.predictions.truncate(top_k);
        Ok(output)
    }
}

impl Classifier for CommandClassifier {
    fn name(&self) -> &str {
        &self.role
    }

    fn predict(
        &mut self,
        image: Option<&Path>,
        top_k: usize,
    ) -> Result<Predictions, ClassifierError> {
        let Some(image) = image else {
            return Ok(Predictions::default());
        };

        let started = Instant::now();
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--image")
            .arg(image)
            .args(["--top-k", &top_k.to_string()])
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| ClassifierError::Invocation(e.to_string()))?;
        if !output.status.success() {
            return Err(ClassifierError::Invocation(format!(
                "{:?} exited with {}",
                self.program, output.status
            )));
        }

        let parsed = self.parse(&output.stdout, top_k)?;
        let latency_ms = parsed
            .inference_ms
            .unwrap_or_else(|| started.elapsed().as_secs_f64() * 1000.0);
        debug!(
            "{} inference: {} labels in {latency_ms:.1} ms",
            self.role,
            parsed.predictions.len()
        );
        Ok(Predictions {
            ranked: parsed.predictions,
            latency_ms,
        })
    }
}

/// A path with a directory part must exist; a bare name is looked up on
/// `PATH`.
fn resolve_program(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return program.is_file().then(|| program.to_path_buf());
    }
    let search = std::env::var_os("PATH")?;
    std::env::split_paths(&search)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    fn class_file(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("class_names.json");
        fs::write(&path, body).unwrap();
        path
    }

    fn basil_mint(dir: &TempDir) -> PathBuf {
        class_file(
            dir,
            r#"{ "class_names": ["Basil", "Mint", "Thyme"], "num_classes": 3 }"#,
        )
    }

    #[test]
    fn class_names_count_must_agree() {
        let dir = tempdir().unwrap();
        let path = class_file(&dir, r#"{ "class_names": ["Basil"], "num_classes": 2 }"#);
        assert!(matches!(
            ClassNames::load(&path),
            Err(ClassifierError::ClassNames { .. })
        ));
    }

    #[test]
    fn missing_program_is_reported() {
        let dir = tempdir().unwrap();
        let config = ClassifierConfig {
            program: PathBuf::from("/nonexistent/herbify"),
            args: Vec::new(),
            class_names: basil_mint(&dir),
        };
        assert!(matches!(
            CommandClassifier::new("herb", &config),
            Err(ClassifierError::ProgramNotFound(_))
        ));
    }

    #[test]
    fn missing_class_names_are_reported() {
        let dir = tempdir().unwrap();
        let config = ClassifierConfig {
            program: PathBuf::from("sh"),
            args: Vec::new(),
            class_names: dir.path().join("absent.json"),
        };
        assert!(matches!(
            CommandClassifier::new("herb", &config),
            Err(ClassifierError::ClassNames { .. })
        ));
    }

    #[cfg(unix)]
    fn scripted(dir: &TempDir, stdout: &str) -> CommandClassifier {
        let config = ClassifierConfig {
            program: PathBuf::from("sh"),
            args: vec![
                "-c".to_string(),
                format!("printf '%s' '{stdout}'"),
                "classifier".to_string(),
            ],
            class_names: basil_mint(dir),
        };
        CommandClassifier::new("herb", &config).unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn parses_ranked_output() {
        let dir = tempdir().unwrap();
        let mut classifier = scripted(
            &dir,
            r#"{"predictions":[{"label":"Basil","confidence":0.9},{"label":"Mint","confidence":0.05}],"inference_ms":40.5}"#,
        );
        let image = dir.path().join("leaf.jpg");

        let predictions = classifier.predict(Some(&image), 1).unwrap();
        assert_eq!(predictions.ranked.len(), 1);
        assert_eq!(predictions.top().unwrap().label, "Basil");
        assert_eq!(predictions.latency_ms, 40.5);
    }

    #[cfg(unix)]
    #[test]
    fn absent_image_yields_empty_ranking() {
        let dir = tempdir().unwrap();
        let mut classifier = scripted(&dir, "not json");
        let predictions = classifier.predict(None, 3).unwrap();
        assert!(predictions.ranked.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn unknown_label_is_rejected() {
        let dir = tempdir().unwrap();
        let mut classifier = scripted(
            &dir,
            r#"{"predictions":[{"label":"Oregano","confidence":0.7}]}"#,
        );
        let image = dir.path().join("leaf.jpg");
        assert!(matches!(
            classifier.predict(Some(&image), 3),
            Err(ClassifierError::Output(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn malformed_output_is_rejected() {
        let dir = tempdir().unwrap();
        let mut classifier = scripted(&dir, "warming up");
        let image = dir.path().join("leaf.jpg");
        assert!(matches!(
            classifier.predict(Some(&image), 3),
            Err(ClassifierError::Output(_))
        ));
    }
}
