// src/deploy/status.rs

//! Human-readable status lines on stdout.
//!
//! Structured diagnostics go through `tracing` to stderr; this is the
//! operator-facing narrative: one start line and one outcome line per step,
//! then either a success summary or a remediation hint.

use std::io::Write;

use crate::config::Settings;

use super::{OrchestrationOutcome, Step, StepReport, Verdict};

const RULE_WIDTH: usize = 60;

pub struct StatusPrinter<W: Write> {
    out: W,
}

impl<W: Write> StatusPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // Status output is best effort: a closed stdout must not abort a
    // deployment half-way.
    fn line(&mut self, text: impl AsRef<str>) {
        let _ = writeln!(self.out, "{}", text.as_ref());
    }

    fn rule(&mut self, ch: char) {
        let rule: String = std::iter::repeat_n(ch, RULE_WIDTH).collect();
        self.line(rule);
    }

    pub fn banner(&mut self, settings: &Settings) {
        self.rule('=');
        self.line("flowdeploy: work pool, worker and deployments");
        self.rule('=');
        self.line(format!("API:      {}", settings.target.base_url()));
        self.line(format!("Project:  {}", settings.project_root.display()));
        self.line(format!("Manifest: {}", settings.manifest.path().display()));
    }

    pub fn step_started(&mut self, step: Step) {
        let total = Step::SEQUENCE.len();
        let n = step.ordinal().unwrap_or(total);
        self.line("");
        self.line(format!("[{n}/{total}] {}", step.title()));
        self.rule('-');
    }

    pub fn step_finished(&mut self, step: Step, report: &StepReport) {
        for note in &report.notes {
            for l in note.lines() {
                self.line(format!("  {l}"));
            }
        }
        if report.ok {
            self.line(format!("ok: {}", step.title()));
            return;
        }

        let severity = if step.is_fatal() { "failed" } else { "failed (continuing)" };
        self.line(format!("{severity}: {}", step.title()));
        if let Some(detail) = &report.detail {
            for l in detail.lines() {
                self.line(format!("  {l}"));
            }
        }
    }

    pub fn step_interrupted(&mut self, step: Step) {
        self.line(format!("stopped: {} (interrupted)", step.title()));
    }

    pub fn summary(&mut self, outcome: &OrchestrationOutcome, settings: &Settings) {
        self.line("");
        self.rule('=');
        match outcome.verdict {
            Verdict::Success => {
                self.line("Deployment complete.");
                self.rule('=');
                for (step, detail) in &outcome.warnings {
                    self.line(format!("warning: {} did not succeed: {detail}", step.title()));
                }
                self.line("Next:");
                self.line(format!("  - open the UI at {}", settings.target.ui_url()));
                self.line("  - trigger a flow run manually");
                self.line(format!(
                    "  - follow the worker log: {}",
                    settings.worker_log.display()
                ));
            }
            Verdict::Failed => {
                self.line(format!("Deployment failed at {}.", outcome.step));
                self.rule('=');
                for hint in remediation_hint(outcome.step, settings) {
                    self.line(format!("  {hint}"));
                }
            }
            Verdict::Stopped => {
                self.line(format!("Deployment stopped at {}.", outcome.step));
                self.rule('=');
                self.line("  A worker that was already started keeps running.");
                self.line("  Run flowdeploy again to resume; finished steps are safe to repeat.");
            }
        }
        self.rule('=');
    }
}

/// What the operator should do before retrying after `step` failed.
pub fn remediation_hint(step: Step, settings: &Settings) -> Vec<String> {
    let retry = "Then run flowdeploy again; steps already done are safe to repeat.".to_string();
    match step {
        Step::CheckingReady => vec![
            format!(
                "The control plane at {} is not reachable.",
                settings.target.base_url()
            ),
            "1. Start it:  flowdeploy server".to_string(),
            "2. Wait until it is fully up.".to_string(),
            format!("3. Check the UI at {}", settings.target.ui_url()),
            retry,
        ],
        Step::ReconcilingPool => vec![
            format!(
                "Could not create work pool '{}' (type {}).",
                settings.pool.name, settings.pool.kind
            ),
            format!(
                "Check that `{}` is installed and can reach {}.",
                settings.cli.program,
                settings.target.base_url()
            ),
            retry,
        ],
        Step::ApplyingManifest => vec![
            format!(
                "Check the manifest at {} and the CLI output above.",
                settings.manifest.path().display()
            ),
            "Set FLOWDEPLOY_MANIFEST or [deploy].manifest to point elsewhere.".to_string(),
            retry,
        ],
        Step::StartingWorker | Step::ReportingResults | Step::Done => vec![retry],
    }
}
