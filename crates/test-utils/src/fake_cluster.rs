use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use flowdeploy::control_plane::{ControlPlane, PoolSummary};
use flowdeploy::errors::{FlowdeployError, Result};
use flowdeploy::exec::{CliCommand, CommandOutput, CommandRunner, DetachedProcess, PreparedCommand};

/// Mutable state of the simulated control plane + CLI.
#[derive(Debug, Default)]
pub struct ClusterState {
    pub reachable: bool,
    pub pools: Vec<String>,
    pub deployments: Vec<String>,

    /// If set, `work-pool create` exits 1 with this stderr.
    pub create_pool_error: Option<String>,
    /// If set, `deploy` exits 1 with this stderr.
    pub apply_error: Option<String>,
    /// `deploy` never returns (for interrupt tests).
    pub apply_hangs: bool,
    pub worker_spawn_fails: bool,
    pub listing_fails: bool,

    /// Successful readiness answers to withhold before becoming reachable.
    pub unreachable_for: u32,

    pub list_pool_calls: u32,
    /// Every CLI command run or spawned, in order.
    pub commands: Vec<CliCommand>,
}

/// A fake cluster that:
/// - answers pool listings from in-memory state
/// - interprets CLI commands against the same state
/// - records everything that was asked of it
///
/// Clones share state, so one clone can serve as the `ControlPlane` and
/// another as the `CommandRunner`.
#[derive(Debug, Clone)]
pub struct FakeCluster {
    state: Arc<Mutex<ClusterState>>,
}

impl Default for FakeCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeCluster {
    /// Reachable control plane with no pools.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ClusterState {
                reachable: true,
                ..Default::default()
            })),
        }
    }

    pub fn unreachable() -> Self {
        let cluster = Self::new();
        cluster.state().reachable = false;
        cluster
    }

    pub fn with_pool(self, name: &str) -> Self {
        self.state().pools.push(name.to_string());
        self
    }

    pub fn state(&self) -> MutexGuard<'_, ClusterState> {
        self.state.lock().unwrap()
    }

    pub fn commands(&self) -> Vec<CliCommand> {
        self.state().commands.clone()
    }

    pub fn created_pools(&self) -> usize {
        self.commands()
            .iter()
            .filter(|c| matches!(c, CliCommand::CreatePool { .. }))
            .count()
    }

    pub fn applied(&self) -> bool {
        self.commands()
            .iter()
            .any(|c| matches!(c, CliCommand::ApplyManifest { .. }))
    }

    pub fn worker_started(&self) -> bool {
        self.commands()
            .iter()
            .any(|c| matches!(c, CliCommand::StartWorker { .. }))
    }

    fn exit(code: i32, stdout: &str, stderr: &str) -> CommandOutput {
        CommandOutput {
            code: Some(code),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }
}

impl ControlPlane for FakeCluster {
    fn list_pools(&self) -> Pin<Box<dyn Future<Output = Result<Vec<PoolSummary>>> + Send + '_>> {
        Box::pin(async move {
            let mut state = self.state();
            state.list_pool_calls += 1;

            if state.unreachable_for > 0 {
                state.unreachable_for -= 1;
                return Err(FlowdeployError::Connectivity(
                    "connection refused (warming up)".to_string(),
                ));
            }
            if !state.reachable {
                return Err(FlowdeployError::Connectivity("connection refused".to_string()));
            }

            Ok(state
                .pools
                .iter()
                .map(|name| PoolSummary {
                    name: name.clone(),
                    kind: Some("process".to_string()),
                })
                .collect())
        })
    }
}

impl CommandRunner for FakeCluster {
    fn run<'a>(
        &'a self,
        cmd: &'a PreparedCommand,
    ) -> Pin<Box<dyn Future<Output = Result<CommandOutput>> + Send + 'a>> {
        Box::pin(async move {
            let hang = {
                let mut state = self.state();
                state.commands.push(cmd.command.clone());
                matches!(cmd.command, CliCommand::ApplyManifest { .. }) && state.apply_hangs
            };
            if hang {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }

            let mut state = self.state();
            let output = match &cmd.command {
                CliCommand::CreatePool { pool } => {
                    let name = pool.name.to_string();
                    if let Some(err) = state.create_pool_error.clone() {
                        Self::exit(1, "", &err)
                    } else if state.pools.contains(&name) {
                        Self::exit(1, "", &format!("Work pool named '{name}' already exists."))
                    } else {
                        state.pools.push(name.clone());
                        Self::exit(0, &format!("Created work pool '{name}'"), "")
                    }
                }
                CliCommand::ApplyManifest { .. } => {
                    if let Some(err) = state.apply_error.clone() {
                        Self::exit(1, "", &err)
                    } else {
                        state.deployments.push("do-flow/default".to_string());
                        Self::exit(0, "Deployment 'do-flow/default' successfully created", "")
                    }
                }
                CliCommand::ListDeployments => {
                    if state.listing_fails {
                        Self::exit(1, "", "listing exploded")
                    } else {
                        Self::exit(0, &state.deployments.join("\n"), "")
                    }
                }
                CliCommand::StartWorker { .. } | CliCommand::StartServer { .. } => {
                    Self::exit(0, "", "")
                }
            };
            Ok(output)
        })
    }

    fn run_attached<'a>(
        &'a self,
        cmd: &'a PreparedCommand,
    ) -> Pin<Box<dyn Future<Output = Result<Option<i32>>> + Send + 'a>> {
        Box::pin(async move {
            self.state().commands.push(cmd.command.clone());
            Ok(Some(0))
        })
    }

    fn spawn_detached(&self, cmd: &PreparedCommand, log_path: &Path) -> Result<DetachedProcess> {
        let mut state = self.state();
        state.commands.push(cmd.command.clone());
        if state.worker_spawn_fails {
            return Err(FlowdeployError::Other(anyhow::anyhow!(
                "spawning detached `{cmd}`: No such file or directory (os error 2)"
            )));
        }
        Ok(DetachedProcess {
            pid: 4242,
            log_path: log_path.to_path_buf(),
        })
    }
}
