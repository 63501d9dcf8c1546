//! `libcamera-still` backed image capture.

use super::ImageCapture;
use herbot_common::config::CaptureConfig;
use herbot_common::timing::seconds;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs the configured still-capture program once per image.
pub struct LibcameraCapture {
    config: CaptureConfig,
}

impl LibcameraCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    /// `scan_<id>_z<z>_<YYYYmmdd_HHMMSS>.jpg` inside the output directory.
    pub fn image_path(&self, scan_id: u32, z_mm: i32) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        self.config
            .output_dir
            .join(format!("scan_{scan_id:03}_z{z_mm:03}_{timestamp}.jpg"))
    }

    fn run(&self, path: &Path) -> Result<(), String> {
        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| format!("cannot create {:?}: {e}", self.config.output_dir))?;

        let mut child = Command::new(&self.config.program)
            .arg("-o")
            .arg(path)
            .args(["--width", &self.config.width.to_string()])
            .args(["--height", &self.config.height.to_string()])
            .arg("--nopreview")
            .args(["-t", &self.config.shutter_ms.to_string()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("cannot start {:?}: {e}", self.config.program))?;

        let timeout = seconds(self.config.timeout_s);
        let started = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) if status.success() => return Ok(()),
                Ok(Some(status)) => return Err(format!("capture exited with {status}")),
                Ok(None) if started.elapsed() >= timeout => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(format!("capture timed out after {:.1} s", timeout.as_secs_f64()));
                }
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(format!("cannot poll capture: {e}")),
            }
        }
    }
}

impl ImageCapture for LibcameraCapture {
    fn capture(&mut self, scan_id: u32, z_mm: i32) -> Option<PathBuf> {
        let path = self.image_path(scan_id, z_mm);
        match self.run(&path) {
            Ok(()) => {
                debug!("Captured {:?}", path);
                Some(path)
            }
            Err(e) => {
                warn!("Camera capture failed: {e}");
                None
            }
        }
    }
}
