//! Time-boxed scan-and-manage loop.
//!
//! Base turning continuously, Z sweeps up and down through the stop list,
//! every stop is imaged and classified, diseased leaves are cut. The sweep
//! ends once the configured duration has elapsed, checked before each pass
//! and before each stop.
//!
//! Every exit route, including panics, funnels through [`ScanSession`]'s
//! finalize, which leaves the rig with Θ stopped, R at 0, Z at 0 and the
//! gripper open.

use super::phase::ScanPhase;
use super::plan::{SweepDirection, SweepPlan};
use super::report::{ScanRecord, ScanReport};
use super::{ScanAbort, ScanError};
use crate::coordinator::MotionCoordinator;
use crate::disease::DiseasePolicy;
use crate::event::RigEvent;
use herbot_common::config::ScanConfig;
use herbot_common::timing::seconds;
use herbot_hal::MoveOutcome;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info, warn};

pub struct ScanOrchestrator {
    config: ScanConfig,
    plan: SweepPlan,
    policy: DiseasePolicy,
}

impl ScanOrchestrator {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            plan: SweepPlan::from_config(&config),
            policy: DiseasePolicy {
                threshold: config.disease_threshold,
                min_confidence: config.min_confidence,
            },
            config,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Run one scan. `cancel` is polled at the same boundaries as the time
    /// budget; a set flag aborts with [`ScanAbort::Interrupted`].
    ///
    /// # Errors
    /// [`ScanError`] carrying the partial report when a step fails or the
    /// scan is interrupted. Finalize has already run by then.
    pub fn run(
        &self,
        rig: &mut MotionCoordinator,
        cancel: &AtomicBool,
    ) -> Result<ScanReport, ScanError> {
        info!(
            "Scan-and-manage: {:.0} s, Z {}..={} mm step {} mm, θ {} @ {}%",
            self.config.duration_s,
            self.config.z_min_mm,
            self.config.z_max_mm,
            self.config.z_step_mm,
            self.config.rotation.label(),
            self.config.theta_speed_percent
        );

        let mut session = ScanSession::begin(rig, &self.config);
        let outcome = self
            .prepare(&mut session)
            .and_then(|()| self.sweep(&mut session, cancel));
        // Every outcome, aborts included, reports its sweep time.
        session.report.duration_s = session.elapsed().as_secs_f64();
        session.finalize();
        let report = session.take_report();

        match outcome {
            Ok(()) => {
                info!("Scan complete: {}", report.summary());
                Ok(report)
            }
            Err(cause) => {
                error!("Scan aborted ({cause}): {}", report.summary());
                Err(ScanError { cause, report })
            }
        }
    }

    fn prepare(&self, session: &mut ScanSession<'_>) -> Result<(), ScanAbort> {
        let rig = &mut *session.rig;
        let status = rig.status();
        if !status.z_homed {
            warn!("Z axis not homed; scan positions may be inaccurate");
        }
        if !status.r_homed {
            warn!("R axis not homed");
        }

        let axes = rig.axes_mut();
        let hold = axes.gripper.default_hold();
        axes.gripper.open(hold);
        rig.retract_reach()?;
        rig.settle(self.config.prepare_settle_s);

        rig.axes_mut()
            .theta
            .start_continuous(self.config.rotation, self.config.theta_speed_percent)?;
        Ok(())
    }

    fn sweep(&self, session: &mut ScanSession<'_>, cancel: &AtomicBool) -> Result<(), ScanAbort> {
        let budget = seconds(self.config.duration_s);
        session.start_clock();
        session.enter(ScanPhase::Sweeping);

        let mut direction = SweepDirection::Up;
        let mut scan_id = 0_u32;
        while session.elapsed() < budget {
            check_cancel(cancel)?;
            info!(
                "Scanning {}: {:?}",
                if direction == SweepDirection::Up { "up" } else { "down" },
                self.plan.pass(direction)
            );

            for z_mm in self.plan.pass(direction) {
                if session.elapsed() >= budget {
                    info!("Scan duration reached");
                    break;
                }
                check_cancel(cancel)?;

                session.enter(ScanPhase::Sweeping);
                self.visit_stop(session, &mut scan_id, z_mm)?;
            }
            direction = direction.flipped();
        }
        Ok(())
    }

    fn visit_stop(
        &self,
        session: &mut ScanSession<'_>,
        scan_id: &mut u32,
        z_mm: i32,
    ) -> Result<(), ScanAbort> {
        let rig = &mut *session.rig;
        rig.axes_mut()
            .z
            .move_to_absolute(f64::from(z_mm), self.config.z_frequency_hz)?
            .into_result()?;
        rig.settle(self.config.stop_settle_s);

        *scan_id += 1;
        let elapsed_s = session.elapsed().as_secs_f64();
        info!("[{elapsed_s:5.1}s] Scan #{:03} @ Z={z_mm:03}mm", *scan_id);

        session.enter(ScanPhase::Capture);
        let image = session.rig.capture_image(*scan_id, z_mm);
        session.report.total_images += 1;

        session.enter(ScanPhase::Classify);
        let observation = session.rig.classify_image(
            *scan_id,
            image,
            self.config.herb_top_k,
            self.config.disease_top_k,
            self.policy,
        );

        if observation.verdict.is_diseased {
            info!(
                "DISEASED: {} ({:.1}%)",
                observation.verdict.label,
                observation.verdict.confidence * 100.0
            );
            session.report.diseased_detected += 1;
            session.enter(ScanPhase::Remove);
            self.remove_leaf(session)?;
            session.rig.emit(RigEvent::LeafRemoved { scan_id: *scan_id });
        } else {
            info!(
                "Healthy: {} ({:.1}%)",
                observation.verdict.label,
                observation.verdict.confidence * 100.0
            );
            session.enter(ScanPhase::Continue);
        }

        session
            .report
            .records
            .push(ScanRecord::from_observation(*scan_id, z_mm, elapsed_s, observation));
        Ok(())
    }

    /// Stop Θ, reach out, cut, pull back, resume Θ.
    fn remove_leaf(&self, session: &mut ScanSession<'_>) -> Result<(), ScanAbort> {
        let config = &self.config;
        let rig = &mut *session.rig;
        let r_speed = rig.r_speed_mm_s();

        rig.axes_mut().theta.stop();
        rig.settle(config.removal_pause_s);

        let hold = rig.axes_mut().gripper.default_hold();
        rig.axes_mut().gripper.open(hold);
        rig.settle(config.removal_pause_s);

        rig.axes_mut()
            .r
            .move_to_absolute(config.r_extend_mm, r_speed)?;
        rig.settle(config.removal_settle_s);

        rig.axes_mut().gripper.cut(seconds(config.cut_time_s));
        session.report.cuts_performed += 1;
        rig.settle(config.removal_settle_s);

        rig.axes_mut().gripper.open(hold);
        rig.settle(config.removal_pause_s);
        rig.retract_reach()?;
        rig.settle(config.removal_settle_s);

        rig.axes_mut()
            .theta
            .start_continuous(config.rotation, config.theta_speed_percent)?;
        info!("Removal complete");
        Ok(())
    }
}

fn check_cancel(cancel: &AtomicBool) -> Result<(), ScanAbort> {
    if cancel.load(Ordering::SeqCst) {
        warn!("Scan interrupted");
        return Err(ScanAbort::Interrupted);
    }
    Ok(())
}

// ─── Session guard ──────────────────────────────────────────────────

/// Exclusive hold on the rig for one scan. Finalize runs exactly once:
/// explicitly at the end of `run`, or from `Drop` while unwinding.
struct ScanSession<'a> {
    rig: &'a mut MotionCoordinator,
    z_frequency_hz: f64,
    phase: ScanPhase,
    started: Duration,
    report: ScanReport,
    finalized: bool,
}

impl<'a> ScanSession<'a> {
    fn begin(rig: &'a mut MotionCoordinator, config: &ScanConfig) -> Self {
        rig.emit(RigEvent::ScanPhase(ScanPhase::Prepare));
        let started = rig.clock().now();
        Self {
            rig,
            z_frequency_hz: config.z_frequency_hz,
            phase: ScanPhase::Prepare,
            started,
            report: ScanReport::default(),
            finalized: false,
        }
    }

    /// The time budget counts from the end of PREPARE.
    fn start_clock(&mut self) {
        self.started = self.rig.clock().now();
    }

    fn elapsed(&self) -> Duration {
        self.rig.clock().now().saturating_sub(self.started)
    }

    fn enter(&mut self, next: ScanPhase) {
        if self.phase == next {
            return;
        }
        if !self.phase.can_transition_to(next) {
            error!("Rejected scan phase transition {} -> {next}", self.phase);
            return;
        }
        self.phase = next;
        self.rig.emit(RigEvent::ScanPhase(next));
    }

    /// Best-effort return to the safe configuration. Every step runs even
    /// if an earlier one failed.
    fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;
        self.enter(ScanPhase::Finalize);
        info!("Finalizing scan: stopping rotation and returning home");

        self.rig.axes_mut().theta.stop();

        if let Err(e) = self.rig.retract_reach() {
            error!("Finalize: R retract failed: {e}");
        }

        match self
            .rig
            .axes_mut()
            .z
            .move_to_absolute(0.0, self.z_frequency_hz)
        {
            Ok(MoveOutcome::Completed) => {}
            Ok(MoveOutcome::Skipped(e)) | Err(e) => error!("Finalize: Z return failed: {e}"),
        }

        let gripper = &mut self.rig.axes_mut().gripper;
        let hold = gripper.default_hold();
        gripper.open(hold);

        self.rig.emit(RigEvent::ScanFinalized);
    }

    fn take_report(&mut self) -> ScanReport {
        std::mem::take(&mut self.report)
    }
}

impl Drop for ScanSession<'_> {
    fn drop(&mut self) {
        if !self.finalized {
            warn!("Scan left early; finalizing from drop");
            self.finalize();
        }
    }
}
