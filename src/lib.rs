// src/lib.rs

pub mod cli;
pub mod config;
pub mod control_plane;
pub mod deploy;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod service;
pub mod types;

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, warn};

use crate::cli::{CliArgs, CliCommandKind};
use crate::config::{Settings, load_settings};
use crate::control_plane::HttpControlPlane;
use crate::deploy::Driver;
use crate::deploy::plan::print_plan;
use crate::exec::RealCommandRunner;

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - settings resolution (environment, `.env`, settings file)
/// - the HTTP control-plane client and the real command runner
/// - the deployment driver, or one of the foreground services
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<i32> {
    let config_path = args.config.as_ref().map(PathBuf::from);
    let settings = load_settings(config_path.as_deref())?;

    if args.dry_run {
        print_plan(&settings, &mut std::io::stdout())?;
        return Ok(0);
    }

    let command = args.command.unwrap_or(CliCommandKind::Deploy);
    debug!(?command, "dispatching");

    match command {
        CliCommandKind::Deploy => deploy(&settings).await,
        CliCommandKind::Server => {
            let exit = service::run_server(&RealCommandRunner::new(), &settings).await?;
            Ok(exit.exit_code())
        }
        CliCommandKind::Worker => {
            let exit = service::run_worker(&RealCommandRunner::new(), &settings).await?;
            Ok(exit.exit_code())
        }
    }
}

async fn deploy(settings: &Settings) -> Result<i32> {
    let control_plane = HttpControlPlane::new(&settings.target, settings.api_timeout)?;
    let mut driver = Driver::new(
        settings,
        control_plane,
        RealCommandRunner::new(),
        std::io::stdout(),
    );

    let outcome = driver.run_until(ctrl_c()).await;
    Ok(outcome.exit_code())
}

/// Resolves on Ctrl-C; never resolves if the signal can't be watched.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
