// src/deploy/driver.rs

use std::fmt;
use std::future::Future;
use std::io::Write;

use tracing::{info, warn};

use crate::config::Settings;
use crate::control_plane::ControlPlane;
use crate::exec::CommandRunner;

use super::core::OrchestrationCore;
use super::status::StatusPrinter;
use super::{OrchestrationOutcome, Step, StepReport, apply, probe, reconcile, report, worker};

/// Runs the deployment sequence.
///
/// IO shell around [`OrchestrationCore`]: executes the current step,
/// prints its status, feeds the report to the core and stops when the core
/// produces an outcome. Steps run one at a time on the calling task.
pub struct Driver<'a, C, R, W>
where
    C: ControlPlane,
    R: CommandRunner,
    W: Write,
{
    settings: &'a Settings,
    control_plane: C,
    runner: R,
    status: StatusPrinter<W>,
}

impl<C, R, W> fmt::Debug for Driver<'_, C, R, W>
where
    C: ControlPlane,
    R: CommandRunner,
    W: Write,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<'a, C, R, W> Driver<'a, C, R, W>
where
    C: ControlPlane,
    R: CommandRunner,
    W: Write,
{
    pub fn new(settings: &'a Settings, control_plane: C, runner: R, out: W) -> Self {
        Self {
            settings,
            control_plane,
            runner,
            status: StatusPrinter::new(out),
        }
    }

    /// Give back the status writer (tests inspect what was printed).
    pub fn into_output(self) -> W {
        self.status.into_inner()
    }

    /// Run every step to completion.
    pub async fn run(&mut self) -> OrchestrationOutcome {
        self.run_until(std::future::pending()).await
    }

    /// Run the sequence, aborting with a `Stopped` outcome as soon as
    /// `shutdown` resolves.
    ///
    /// The step in flight is dropped: a captured CLI call is killed, a
    /// detached worker that was already started is left running.
    pub async fn run_until<F>(&mut self, shutdown: F) -> OrchestrationOutcome
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut core = OrchestrationCore::new();
        self.status.banner(self.settings);
        info!(api = %self.settings.target.base_url(), "deployment started");

        loop {
            let step = core.current();
            self.status.step_started(step);

            let report = tokio::select! {
                _ = &mut shutdown => None,
                report = self.execute(step) => Some(report),
            };

            let Some(report) = report else {
                warn!(%step, "interrupted; stopping");
                self.status.step_interrupted(step);
                let outcome = core.stop();
                self.status.summary(&outcome, self.settings);
                return outcome;
            };

            self.status.step_finished(step, &report);

            if let Some(outcome) = core.record(report) {
                info!(
                    step = %outcome.step,
                    verdict = ?outcome.verdict,
                    warnings = outcome.warnings.len(),
                    "deployment finished"
                );
                self.status.summary(&outcome, self.settings);
                return outcome;
            }
        }
    }

    async fn execute(&self, step: Step) -> StepReport {
        let settings = self.settings;
        match step {
            Step::CheckingReady => {
                let (readiness, attempts) =
                    probe::check_with_retry(&self.control_plane, settings.probe).await;
                match readiness {
                    probe::Readiness::Ready => StepReport::ok().with_note(format!(
                        "control plane ready at {}",
                        settings.target.base_url()
                    )),
                    probe::Readiness::NotReady(reason) => StepReport::failed(format!(
                        "control plane not ready after {attempts} attempt(s): {reason}"
                    )),
                }
            }
            Step::ReconcilingPool => {
                match reconcile::ensure_pool(&self.control_plane, &self.runner, settings).await {
                    Ok(state) if state.created => StepReport::ok()
                        .with_note(format!("created work pool '{}'", settings.pool.name)),
                    Ok(_) => StepReport::ok()
                        .with_note(format!("work pool '{}' already exists", settings.pool.name)),
                    Err(e) => StepReport::failed(e.detail()),
                }
            }
            Step::StartingWorker => match worker::start_worker(&self.runner, settings) {
                Ok(w) => StepReport::ok()
                    .with_note(format!(
                        "worker '{}' running in background (pid {})",
                        w.worker_name, w.pid
                    ))
                    .with_note(format!("log file: {}", w.log_path.display())),
                Err(e) => StepReport::failed(format!(
                    "{}; start it later with `flowdeploy worker`",
                    e.detail()
                )),
            },
            Step::ApplyingManifest => match apply::apply_manifest(&self.runner, settings).await {
                Ok(applied) => {
                    let mut report = StepReport::ok().with_note(format!(
                        "manifest fingerprint {}",
                        short(&applied.fingerprint)
                    ));
                    if !applied.output.is_empty() {
                        report = report.with_note(applied.output);
                    }
                    report
                }
                Err(e) => StepReport::failed(e.detail()),
            },
            Step::ReportingResults => {
                match report::list_deployments(&self.runner, settings).await {
                    Ok(listing) if listing.is_empty() => {
                        StepReport::ok().with_note("(no deployments listed)")
                    }
                    Ok(listing) => StepReport::ok().with_note(listing),
                    Err(e) => StepReport::failed(e.detail()),
                }
            }
            Step::Done => StepReport::ok(),
        }
    }
}

fn short(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}
