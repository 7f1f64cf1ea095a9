// src/exec/backend.rs

//! Pluggable command runner abstraction.
//!
//! The deployment steps talk to a `CommandRunner` instead of spawning
//! processes directly. Production uses [`RealCommandRunner`]; tests provide a
//! fake that records what was run and simulates the CLI's answers.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tracing::{debug, info};

use crate::errors::{FlowdeployError, Result};

use super::command::PreparedCommand;
use super::detached;

/// Captured result of a finished CLI invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, or `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Convert a non-zero exit into [`FlowdeployError::ExternalCommand`].
    ///
    /// The diagnostic is stderr, or stdout when the tool wrote its error
    /// there instead.
    pub fn into_result(self, prepared: &PreparedCommand) -> Result<CommandOutput> {
        if self.success() {
            return Ok(self);
        }
        let diagnostic = if self.stderr.trim().is_empty() {
            self.stdout.trim().to_string()
        } else {
            self.stderr.trim().to_string()
        };
        Err(FlowdeployError::ExternalCommand {
            command: prepared.to_string(),
            code: self.code.unwrap_or(-1),
            stderr: diagnostic,
        })
    }
}

/// A process that was started and then released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachedProcess {
    pub pid: u32,
    pub log_path: PathBuf,
}

/// Trait abstracting how CLI commands are executed.
pub trait CommandRunner: Send + Sync {
    /// Run to completion with stdout/stderr captured.
    ///
    /// A non-zero exit is *not* an error here; only failing to spawn or wait
    /// is. Callers decide what an exit code means.
    fn run<'a>(
        &'a self,
        cmd: &'a PreparedCommand,
    ) -> Pin<Box<dyn Future<Output = Result<CommandOutput>> + Send + 'a>>;

    /// Run to completion with stdio inherited from this process.
    fn run_attached<'a>(
        &'a self,
        cmd: &'a PreparedCommand,
    ) -> Pin<Box<dyn Future<Output = Result<Option<i32>>> + Send + 'a>>;

    /// Start in the background, detached from this process's session, with
    /// stdout and stderr merged into `log_path`. Never waits on the child.
    fn spawn_detached(&self, cmd: &PreparedCommand, log_path: &Path) -> Result<DetachedProcess>;
}

/// Runner that spawns real OS processes via `tokio::process::Command`.
#[derive(Debug, Clone, Default)]
pub struct RealCommandRunner;

impl RealCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for RealCommandRunner {
    fn run<'a>(
        &'a self,
        cmd: &'a PreparedCommand,
    ) -> Pin<Box<dyn Future<Output = Result<CommandOutput>> + Send + 'a>> {
        Box::pin(async move {
            info!(cmd = %cmd, cwd = ?cmd.spec.cwd, "running command");

            let mut child = cmd.spec.to_tokio();
            child
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            let output = child
                .output()
                .await
                .with_context(|| format!("spawning `{cmd}`"))?;

            let out = CommandOutput {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            };

            debug!(
                cmd = %cmd,
                exit_code = ?out.code,
                stdout_len = out.stdout.len(),
                stderr_len = out.stderr.len(),
                "command exited"
            );
            Ok(out)
        })
    }

    fn run_attached<'a>(
        &'a self,
        cmd: &'a PreparedCommand,
    ) -> Pin<Box<dyn Future<Output = Result<Option<i32>>> + Send + 'a>> {
        Box::pin(async move {
            info!(cmd = %cmd, "running attached command");

            let mut child = cmd.spec.to_tokio();
            child
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .kill_on_drop(true);

            let status = child
                .status()
                .await
                .with_context(|| format!("spawning `{cmd}`"))?;

            info!(cmd = %cmd, exit_code = ?status.code(), "attached command exited");
            Ok(status.code())
        })
    }

    fn spawn_detached(&self, cmd: &PreparedCommand, log_path: &Path) -> Result<DetachedProcess> {
        detached::spawn_detached(&cmd.spec, log_path)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::exec::command::{CliCommand, CommandSpec};

    fn sh(script: &str) -> PreparedCommand {
        PreparedCommand {
            command: CliCommand::ListDeployments,
            spec: CommandSpec {
                program: "sh".into(),
                args: vec!["-c".into(), script.into()],
                env: vec![("FLOWDEPLOY_TEST_VAR".into(), "scoped".into())],
                cwd: None,
            },
        }
    }

    #[tokio::test]
    async fn captures_stdout_and_child_env() {
        let out = RealCommandRunner::new()
            .run(&sh("echo \"value=$FLOWDEPLOY_TEST_VAR\""))
            .await
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "value=scoped");
        assert!(std::env::var("FLOWDEPLOY_TEST_VAR").is_err());
    }

    #[tokio::test]
    async fn non_zero_exit_surfaces_stderr() {
        let cmd = sh("echo boom >&2; exit 3");
        let out = RealCommandRunner::new().run(&cmd).await.unwrap();
        assert_eq!(out.code, Some(3));

        match out.into_result(&cmd) {
            Err(FlowdeployError::ExternalCommand { code, stderr, .. }) => {
                assert_eq!(code, 3);
                assert_eq!(stderr, "boom");
            }
            other => panic!("expected ExternalCommand, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stdout_used_when_stderr_is_empty() {
        let cmd = sh("echo 'pool already exists'; exit 1");
        let out = RealCommandRunner::new().run(&cmd).await.unwrap();
        let err = out.into_result(&cmd).unwrap_err();
        assert!(err.detail().contains("already exists"));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let cmd = PreparedCommand {
            command: CliCommand::ListDeployments,
            spec: CommandSpec {
                program: "/nonexistent/flowdeploy-cli".into(),
                args: vec![],
                env: vec![],
                cwd: None,
            },
        };
        assert!(RealCommandRunner::new().run(&cmd).await.is_err());
    }
}
