// src/service.rs

//! Long-running foreground processes: the control-plane server and a
//! terminal-attached worker.

use std::fs;

use anyhow::Context;
use tracing::{info, warn};

use crate::config::Settings;
use crate::errors::Result;
use crate::exec::{CliCommand, CommandRunner, PreparedCommand};

/// How a foreground process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceExit {
    pub code: Option<i32>,
    /// The operator pressed Ctrl-C.
    pub interrupted: bool,
}

impl ServiceExit {
    /// Interrupting a service is the normal way to stop it.
    pub fn exit_code(&self) -> i32 {
        match (self.interrupted, self.code) {
            (true, _) | (false, Some(0)) => 0,
            _ => 1,
        }
    }
}

/// Start the control-plane server bound to the resolved host and port.
///
/// Creates the server home directory first; it is handed to the server
/// through the child environment.
pub async fn run_server<R: CommandRunner + ?Sized>(
    runner: &R,
    settings: &Settings,
) -> Result<ServiceExit> {
    fs::create_dir_all(&settings.server_home)
        .with_context(|| format!("creating server home {:?}", settings.server_home))?;

    let cmd = CliCommand::StartServer {
        host: settings.target.host().to_string(),
        port: settings.target.port(),
    }
    .prepare(settings);

    println!("Starting control-plane server");
    println!("  home: {}", settings.server_home.display());
    println!("  UI:   {}", settings.target.ui_url());
    println!("  API:  {}", settings.target.base_url());
    println!("Press Ctrl+C to stop.");
    println!("{}", "-".repeat(50));

    run_foreground(runner, &cmd).await
}

/// Run a worker for the configured pool, attached to this terminal.
pub async fn run_worker<R: CommandRunner + ?Sized>(
    runner: &R,
    settings: &Settings,
) -> Result<ServiceExit> {
    let cmd = CliCommand::StartWorker {
        pool: settings.pool.name.clone(),
        worker_name: settings.worker_name.clone(),
    }
    .prepare(settings);

    println!(
        "Starting worker '{}' for pool '{}' (Ctrl+C to stop)",
        settings.worker_name, settings.pool.name
    );
    run_foreground(runner, &cmd).await
}

async fn run_foreground<R: CommandRunner + ?Sized>(
    runner: &R,
    cmd: &PreparedCommand,
) -> Result<ServiceExit> {
    let run = runner.run_attached(cmd);
    tokio::pin!(run);

    tokio::select! {
        code = &mut run => {
            let code = code?;
            info!(cmd = %cmd, exit_code = ?code, "process exited");
            Ok(ServiceExit { code, interrupted: false })
        }
        signal = tokio::signal::ctrl_c() => {
            let interrupted = match signal {
                Ok(()) => {
                    println!();
                    println!("Stopping...");
                    true
                }
                Err(e) => {
                    warn!(error = %e, "failed to listen for Ctrl+C");
                    false
                }
            };
            // The child shares our process group and got the same signal;
            // give it the chance to shut down on its own.
            let code = run.await?;
            info!(cmd = %cmd, exit_code = ?code, interrupted, "process finished");
            Ok(ServiceExit { code, interrupted })
        }
    }
}
