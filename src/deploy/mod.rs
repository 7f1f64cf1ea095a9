// src/deploy/mod.rs

//! The deployment sequence.
//!
//! Steps run strictly in order, each at most once per run:
//!
//! `CheckingReady → ReconcilingPool → StartingWorker → ApplyingManifest →
//! ReportingResults → Done`
//!
//! The pure decision logic (what is fatal, what comes next) lives in
//! [`core`]; [`driver`] is the async shell that executes steps against a
//! [`crate::control_plane::ControlPlane`] and a [`crate::exec::CommandRunner`].
//! Each step module catches its own failures and hands back a
//! [`StepReport`]; only the core decides whether a failure ends the run.

pub mod apply;
pub mod core;
pub mod driver;
pub mod plan;
pub mod probe;
pub mod reconcile;
pub mod report;
pub mod status;
pub mod worker;

use std::fmt;

pub use self::core::OrchestrationCore;
pub use driver::Driver;

/// A stage of the deployment sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    CheckingReady,
    ReconcilingPool,
    StartingWorker,
    ApplyingManifest,
    ReportingResults,
    Done,
}

impl Step {
    pub const FIRST: Step = Step::CheckingReady;

    /// Steps that actually do something, in execution order.
    pub const SEQUENCE: [Step; 5] = [
        Step::CheckingReady,
        Step::ReconcilingPool,
        Step::StartingWorker,
        Step::ApplyingManifest,
        Step::ReportingResults,
    ];

    pub fn next(self) -> Step {
        match self {
            Step::CheckingReady => Step::ReconcilingPool,
            Step::ReconcilingPool => Step::StartingWorker,
            Step::StartingWorker => Step::ApplyingManifest,
            Step::ApplyingManifest => Step::ReportingResults,
            Step::ReportingResults | Step::Done => Step::Done,
        }
    }

    /// Whether a failure of this step ends the run.
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            Step::CheckingReady | Step::ReconcilingPool | Step::ApplyingManifest
        )
    }

    /// 1-based position in [`Step::SEQUENCE`]; `Done` has none.
    pub fn ordinal(self) -> Option<usize> {
        Step::SEQUENCE.iter().position(|s| *s == self).map(|i| i + 1)
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::CheckingReady => "Check control plane",
            Step::ReconcilingPool => "Ensure work pool",
            Step::StartingWorker => "Start worker",
            Step::ApplyingManifest => "Apply deployments",
            Step::ReportingResults => "List deployments",
            Step::Done => "Done",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::CheckingReady => "CheckingReady",
            Step::ReconcilingPool => "ReconcilingPool",
            Step::StartingWorker => "StartingWorker",
            Step::ApplyingManifest => "ApplyingManifest",
            Step::ReportingResults => "ReportingResults",
            Step::Done => "Done",
        };
        f.write_str(name)
    }
}

/// What a step hands back to the driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    pub ok: bool,
    /// Diagnostic text; set on failure.
    pub detail: Option<String>,
    /// Informational lines for the operator.
    pub notes: Vec<String>,
}

impl StepReport {
    pub fn ok() -> Self {
        Self {
            ok: true,
            ..Default::default()
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            ok: false,
            detail: Some(detail.into()),
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

/// Final verdict of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failed,
    /// Interrupted by the operator.
    Stopped,
}

/// Result of one orchestration run. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestrationOutcome {
    /// Step reached: `Done` on success, otherwise the step that failed or
    /// was interrupted.
    pub step: Step,
    pub verdict: Verdict,
    pub detail: Option<String>,
    /// Non-fatal failures recorded along the way.
    pub warnings: Vec<(Step, String)>,
}

impl OrchestrationOutcome {
    pub fn is_success(&self) -> bool {
        self.verdict == Verdict::Success
    }

    pub fn exit_code(&self) -> i32 {
        match self.verdict {
            Verdict::Success => 0,
            Verdict::Failed => 1,
            Verdict::Stopped => 130,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_follows_next() {
        let mut step = Step::FIRST;
        let mut seen = vec![];
        while step != Step::Done {
            seen.push(step);
            step = step.next();
        }
        assert_eq!(seen, Step::SEQUENCE.to_vec());
        assert_eq!(Step::Done.next(), Step::Done);
    }

    #[test]
    fn only_worker_and_listing_are_non_fatal() {
        let non_fatal: Vec<_> = Step::SEQUENCE.iter().filter(|s| !s.is_fatal()).collect();
        assert_eq!(non_fatal, vec![&Step::StartingWorker, &Step::ReportingResults]);
    }

    #[test]
    fn ordinals_are_one_based() {
        assert_eq!(Step::CheckingReady.ordinal(), Some(1));
        assert_eq!(Step::ReportingResults.ordinal(), Some(5));
        assert_eq!(Step::Done.ordinal(), None);
    }
}
