// src/deploy/report.rs

//! Post-deployment listing for the operator.

use crate::config::Settings;
use crate::errors::Result;
use crate::exec::{CliCommand, CommandRunner};

/// Ask the CLI for the current deployments and return its output.
pub async fn list_deployments<R: CommandRunner + ?Sized>(
    runner: &R,
    settings: &Settings,
) -> Result<String> {
    let cmd = CliCommand::ListDeployments.prepare(settings);
    let output = runner.run(&cmd).await?.into_result(&cmd)?;
    Ok(output.stdout.trim_end().to_string())
}
