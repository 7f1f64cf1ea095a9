// src/exec/command.rs

//! Typed builder for external CLI invocations.
//!
//! Every call the orchestrator makes to the workflow CLI is a [`CliCommand`]
//! variant. Arguments come from already-validated [`Settings`] values, so a
//! [`PreparedCommand`] is well-formed before anything is spawned.

use std::fmt;
use std::path::PathBuf;

use crate::config::env;
use crate::config::{DeploymentManifest, Settings};
use crate::types::{PoolName, ResourcePool};

/// An operation of the external workflow CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// `work-pool create <name> --type <kind>`
    CreatePool { pool: ResourcePool },
    /// `worker start --pool <pool> --name <worker>`
    StartWorker { pool: PoolName, worker_name: String },
    /// `deploy --all --prefect-file <manifest>`
    ApplyManifest { manifest: DeploymentManifest },
    /// `deployment ls`
    ListDeployments,
    /// `server start --host <host> --port <port>`
    StartServer { host: String, port: u16 },
}

impl CliCommand {
    /// Short operator-facing description.
    pub fn description(&self) -> String {
        match self {
            CliCommand::CreatePool { pool } => format!("create work pool '{}'", pool.name),
            CliCommand::StartWorker { pool, worker_name } => {
                format!("start worker '{worker_name}' for pool '{pool}'")
            }
            CliCommand::ApplyManifest { manifest } => {
                format!("apply all deployments in {}", manifest.path().display())
            }
            CliCommand::ListDeployments => "list deployments".to_string(),
            CliCommand::StartServer { host, port } => {
                format!("start control-plane server on {host}:{port}")
            }
        }
    }

    fn args(&self) -> Vec<String> {
        let strs = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        match self {
            CliCommand::CreatePool { pool } => strs(&[
                "work-pool",
                "create",
                pool.name.as_str(),
                "--type",
                pool.kind.as_str(),
            ]),
            CliCommand::StartWorker { pool, worker_name } => strs(&[
                "worker",
                "start",
                "--pool",
                pool.as_str(),
                "--name",
                worker_name.as_str(),
            ]),
            CliCommand::ApplyManifest { manifest } => {
                let mut args = strs(&["deploy", "--all", "--prefect-file"]);
                args.push(manifest.path().display().to_string());
                args
            }
            CliCommand::ListDeployments => strs(&["deployment", "ls"]),
            CliCommand::StartServer { host, port } => {
                let mut args = strs(&["server", "start", "--host", host.as_str()]);
                args.push("--port".to_string());
                args.push(port.to_string());
                args
            }
        }
    }

    /// Bind this command to concrete program, environment and working dir.
    ///
    /// Resolved settings are handed to the child through its environment
    /// only; nothing is written to this process's environment.
    pub fn prepare(self, settings: &Settings) -> PreparedCommand {
        let mut args = settings.cli.prefix_args.clone();
        args.extend(self.args());

        let mut env_vars = vec![
            (env::API_URL.to_string(), settings.target.base_url().to_string()),
            (
                env::PROJECT_ROOT.to_string(),
                settings.project_root.display().to_string(),
            ),
        ];

        let cwd = match &self {
            CliCommand::ApplyManifest { manifest } => {
                settings.project_root.join(manifest.working_dir())
            }
            CliCommand::StartServer { host, port } => {
                env_vars.push((env::API_HOST.to_string(), host.clone()));
                env_vars.push((env::API_PORT.to_string(), port.to_string()));
                env_vars.push((
                    env::HOME.to_string(),
                    settings.server_home.display().to_string(),
                ));
                settings.project_root.clone()
            }
            _ => settings.project_root.clone(),
        };

        PreparedCommand {
            command: self,
            spec: CommandSpec {
                program: settings.cli.program.clone(),
                args,
                env: env_vars,
                cwd: Some(cwd),
            },
        }
    }
}

/// A raw process description: program, args, extra env, working dir.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn to_std(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(&self.args);
        cmd.envs(self.env.iter().map(|(k, v)| (k, v)));
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }

    pub fn to_tokio(&self) -> tokio::process::Command {
        tokio::process::Command::from(self.to_std())
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// A typed command together with the process spec that runs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCommand {
    pub command: CliCommand,
    pub spec: CommandSpec,
}

impl fmt::Display for PreparedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.spec.fmt(f)
    }
}
