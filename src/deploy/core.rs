// src/deploy/core.rs

//! Pure orchestration state machine.
//!
//! Consumes one [`StepReport`] per step and decides whether the run goes on
//! or ends. No IO, no Tokio, no processes: the async shell in
//! [`super::driver`] executes the steps and feeds the reports in.

use tracing::{debug, warn};

use super::{OrchestrationOutcome, Step, StepReport, Verdict};

#[derive(Debug, Clone)]
pub struct OrchestrationCore {
    current: Step,
    warnings: Vec<(Step, String)>,
}

impl Default for OrchestrationCore {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestrationCore {
    pub fn new() -> Self {
        Self {
            current: Step::FIRST,
            warnings: Vec::new(),
        }
    }

    /// Step that should run next.
    pub fn current(&self) -> Step {
        self.current
    }

    /// Record the report of the current step.
    ///
    /// Returns the final outcome when the run is over (fatal failure or
    /// the last step done), `None` when [`Self::current`] should run next.
    pub fn record(&mut self, report: StepReport) -> Option<OrchestrationOutcome> {
        let step = self.current;

        if !report.ok {
            let detail = report
                .detail
                .unwrap_or_else(|| format!("{step} failed"));

            if step.is_fatal() {
                debug!(%step, "fatal step failure; ending run");
                return Some(OrchestrationOutcome {
                    step,
                    verdict: Verdict::Failed,
                    detail: Some(detail),
                    warnings: std::mem::take(&mut self.warnings),
                });
            }

            warn!(%step, %detail, "non-fatal step failure; continuing");
            self.warnings.push((step, detail));
        }

        self.current = step.next();
        if self.current == Step::Done {
            return Some(OrchestrationOutcome {
                step: Step::Done,
                verdict: Verdict::Success,
                detail: None,
                warnings: std::mem::take(&mut self.warnings),
            });
        }
        None
    }

    /// End the run because the operator interrupted it.
    pub fn stop(&mut self) -> OrchestrationOutcome {
        OrchestrationOutcome {
            step: self.current,
            verdict: Verdict::Stopped,
            detail: Some("interrupted".to_string()),
            warnings: std::mem::take(&mut self.warnings),
        }
    }
}
